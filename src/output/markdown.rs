//! Inline Markdown renderer used when no output directory is given.

use crate::models::Documents;
use crate::output::OutputRenderer;

/// Opening paragraph of the inline result.
pub const INTRO: &str = "RECOMMENDATION: The following documentation MD files are generated for your project. \
Be aware that it will overwrite existing files. It is suggested to save them in a `docs/` directory \
at the root of your project, or another location if preferred.";

/// Separator between document sections.
pub const SECTION_SEPARATOR: &str = "\n\n---\n\n";

/// All documents as `## {label}` sections under an intro.
pub struct MarkdownRenderer;

impl OutputRenderer for MarkdownRenderer {
    fn render(&self, documents: &Documents) -> String {
        std::iter::once(INTRO.to_string())
            .chain(
                documents
                    .iter()
                    .map(|(label, content)| format!("## {label}\n\n{content}")),
            )
            .collect::<Vec<_>>()
            .join(SECTION_SEPARATOR)
    }
}
