//! XML serialization of a [`RepositoryContext`].
//!
//! The payload is uploaded once as the model's cached context, so it
//! must always be well-formed: free text is stripped of XML-illegal
//! control characters and file bodies go into CDATA sections.

use quick_xml::Writer;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use super::ContextError;
use crate::models::{CommitRecord, FileEntry, FileStat, RepositoryContext};

/// Remove control characters that XML 1.0 cannot carry.
///
/// Tab, line feed and carriage return are kept.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|&c| !is_illegal_control(c))
        .collect()
}

fn is_illegal_control(c: char) -> bool {
    matches!(c, '\u{00}'..='\u{08}' | '\u{0B}' | '\u{0C}' | '\u{0E}'..='\u{1F}' | '\u{7F}')
}

/// Split `content` so that no section contains the CDATA terminator.
///
/// Concatenating the sections yields `content` unchanged.
pub fn cdata_sections(content: &str) -> Vec<&str> {
    let mut sections = Vec::new();
    let mut rest = content;
    while let Some(idx) = rest.find("]]>") {
        sections.push(&rest[..idx + 2]);
        rest = &rest[idx + 2..];
    }
    sections.push(rest);
    sections
}

/// Render the full `<repository_context>` document.
pub fn assemble(context: &RepositoryContext) -> Result<String, ContextError> {
    let mut doc = XmlDoc::new();
    doc.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    doc.open("repository_context", &[])?;

    doc.text_element("project_name", &context.project_name)?;
    doc.text_element("analysis_timestamp", &context.timestamp)?;
    doc.text_element("branch", &context.branch)?;
    doc.text_element("directory_tree", &context.tree)?;

    doc.open("source_code_corpus", &[])?;
    for file in &context.files {
        match file_fragment(file) {
            Ok(fragment) => doc.append(&fragment),
            Err(err) => tracing::warn!(path = %file.path, "skipping file in context payload: {err}"),
        }
    }
    doc.close("source_code_corpus")?;

    doc.open("hotspots", &[])?;
    for stat in &context.hotspots {
        doc.hotspot(stat)?;
    }
    doc.close("hotspots")?;

    doc.open("commit_history", &[])?;
    for commit in &context.commits {
        doc.commit(commit)?;
    }
    doc.close("commit_history")?;

    doc.close("repository_context")?;
    doc.finish()
}

/// One `<file>` element of the corpus, serialized on its own so a failure
/// never leaves a partial element in the payload.
fn file_fragment(file: &FileEntry) -> Result<Vec<u8>, ContextError> {
    let mut fragment = XmlDoc::new();
    fragment.file(file)?;
    Ok(fragment.writer.into_inner())
}

struct XmlDoc {
    writer: Writer<Vec<u8>>,
}

impl XmlDoc {
    fn new() -> Self {
        Self {
            writer: Writer::new(Vec::new()),
        }
    }

    fn event(&mut self, event: Event<'_>) -> Result<(), ContextError> {
        self.writer
            .write_event(event)
            .map_err(|e| ContextError::Xml(e.to_string()))
    }

    fn open(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), ContextError> {
        let mut start = BytesStart::new(name);
        for &attribute in attributes {
            start.push_attribute(attribute);
        }
        self.event(Event::Start(start))
    }

    fn append(&mut self, fragment: &[u8]) {
        self.writer.get_mut().extend_from_slice(fragment);
    }

    fn close(&mut self, name: &str) -> Result<(), ContextError> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn empty(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), ContextError> {
        let mut start = BytesStart::new(name);
        for &attribute in attributes {
            start.push_attribute(attribute);
        }
        self.event(Event::Empty(start))
    }

    fn text_element(&mut self, name: &str, text: &str) -> Result<(), ContextError> {
        self.open(name, &[])?;
        let clean = sanitize(text);
        if !clean.is_empty() {
            self.event(Event::Text(BytesText::new(&clean)))?;
        }
        self.close(name)
    }

    fn file(&mut self, file: &FileEntry) -> Result<(), ContextError> {
        let path = sanitize(&file.path);
        let content = sanitize(&file.content);
        self.open("file", &[("path", path.as_str())])?;
        for section in cdata_sections(&content) {
            self.event(Event::CData(BytesCData::new(section)))?;
        }
        self.close("file")
    }

    fn hotspot(&mut self, stat: &FileStat) -> Result<(), ContextError> {
        let path = sanitize(&stat.path);
        self.open("file", &[("path", path.as_str())])?;
        self.text_element("commits", &stat.commits.to_string())?;
        self.text_element("lines_added", &stat.lines_added.to_string())?;
        self.text_element("lines_deleted", &stat.lines_deleted.to_string())?;
        self.close("file")
    }

    fn commit(&mut self, commit: &CommitRecord) -> Result<(), ContextError> {
        let id = sanitize(&commit.short_id);
        self.open("commit", &[("id", id.as_str())])?;
        self.text_element("author", &commit.author_name)?;
        self.text_element("date", &commit.author_time)?;
        self.text_element("message", &commit.subject)?;
        let count = commit.files_changed.to_string();
        self.empty("files_changed", &[("count", count.as_str())])?;
        let insertions = commit.insertions.to_string();
        let deletions = commit.deletions.to_string();
        self.empty(
            "stats",
            &[("insertions", insertions.as_str()), ("deletions", deletions.as_str())],
        )?;
        self.close("commit")
    }

    fn finish(self) -> Result<String, ContextError> {
        String::from_utf8(self.writer.into_inner()).map_err(|e| ContextError::Xml(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChangeKind, FileChange};
    use proptest::prelude::*;

    fn sample_context() -> RepositoryContext {
        let mut stat = FileStat::new("src/lib.rs");
        stat.commits = 2;
        stat.lines_added = 10;
        stat.lines_deleted = 3;

        RepositoryContext {
            project_name: "demo".into(),
            timestamp: "2024-05-01T10:00:00+00:00".into(),
            branch: "main".into(),
            tree: "└── src\n    └── lib.rs\n".into(),
            files: vec![FileEntry {
                path: "src/lib.rs".into(),
                content: "fn main() { let s = \"a]]>b\"; }\u{0}".into(),
            }],
            hotspots: vec![stat],
            commits: vec![CommitRecord {
                id: "0123456789abcdef".into(),
                short_id: "0123456".into(),
                author_name: "Ada <dev>".into(),
                author_email: "ada@example.com".into(),
                author_time: "2024-05-01T10:00:00+00:00".into(),
                subject: "Fix\u{1B} & tidy".into(),
                body: String::new(),
                changes: vec![FileChange {
                    kind: ChangeKind::Modify,
                    old_path: None,
                    new_path: "src/lib.rs".into(),
                    lines_added: 10,
                    lines_deleted: 3,
                }],
                files_changed: 1,
                insertions: 10,
                deletions: 3,
            }],
        }
    }

    #[test]
    fn sanitize_strips_illegal_controls_only() {
        assert_eq!(sanitize("a\u{0}b\u{7}c\u{B}\u{C}\u{1F}\u{7F}d"), "abcd");
        assert_eq!(sanitize("tab\tnl\ncr\r"), "tab\tnl\ncr\r");
        assert_eq!(sanitize("ünïcode ✓"), "ünïcode ✓");
    }

    #[test]
    fn cdata_sections_never_contain_terminator() {
        let sections = cdata_sections("x]]>y]]>]]>z");
        assert_eq!(sections.concat(), "x]]>y]]>]]>z");
        assert!(sections.iter().all(|s| !s.contains("]]>")));
        assert_eq!(cdata_sections(""), vec![""]);
    }

    #[test]
    fn assembles_expected_structure() {
        let xml = assemble(&sample_context()).unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<project_name>demo</project_name>"));
        assert!(xml.contains("<branch>main</branch>"));
        assert!(xml.contains("<file path=\"src/lib.rs\">"));
        assert!(xml.contains("<![CDATA[fn main() { let s = \"a]]]]><![CDATA[>b\"; }]]>"));
        assert!(xml.contains("<commits>2</commits>"));
        assert!(xml.contains("<lines_deleted>3</lines_deleted>"));
        assert!(xml.contains("<commit id=\"0123456\">"));
        assert!(xml.contains("<author>Ada &lt;dev&gt;</author>"));
        assert!(xml.contains("<message>Fix &amp; tidy</message>"));
        assert!(xml.contains("<files_changed count=\"1\"/>"));
        assert!(xml.contains("<stats insertions=\"10\" deletions=\"3\"/>"));
        assert!(!xml.contains('\u{0}'));
        assert!(!xml.contains('\u{1B}'));
    }

    #[test]
    fn payload_parses_back_with_content_intact() {
        use quick_xml::Reader;

        let xml = assemble(&sample_context()).unwrap();
        let mut reader = Reader::from_str(&xml);
        let mut content = String::new();
        loop {
            match reader.read_event().unwrap() {
                Event::CData(e) => content.push_str(std::str::from_utf8(&e.into_inner()).unwrap()),
                Event::Eof => break,
                _ => {}
            }
        }
        assert_eq!(content, "fn main() { let s = \"a]]>b\"; }");
    }

    #[test]
    fn corpus_is_whole_file_fragments_in_order() {
        let mut context = sample_context();
        context.files.push(FileEntry {
            path: "src/main.rs".into(),
            content: "fn main() {}".into(),
        });

        let fragments: Vec<String> = context
            .files
            .iter()
            .map(|f| String::from_utf8(file_fragment(f).unwrap()).unwrap())
            .collect();
        assert!(fragments.iter().all(|f| f.starts_with("<file path=") && f.ends_with("</file>")));

        let xml = assemble(&context).unwrap();
        let expected = format!("<source_code_corpus>{}</source_code_corpus>", fragments.concat());
        assert!(xml.contains(&expected), "got: {xml}");
    }

    #[test]
    fn empty_context_is_well_formed() {
        let xml = assemble(&RepositoryContext::default()).unwrap();
        assert!(xml.contains("<source_code_corpus>"));
        assert!(xml.contains("</repository_context>"));
    }

    proptest! {
        #[test]
        fn sanitize_is_idempotent(s in any::<String>()) {
            let once = sanitize(&s);
            prop_assert_eq!(sanitize(&once), once.clone());
            prop_assert!(!once.chars().any(is_illegal_control));
        }
    }
}
