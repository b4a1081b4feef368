//! Document strategy definitions.
//!
//! Every generated document runs the same prompt/response round trip;
//! they differ only in which templates they load. The evaluation pass
//! additionally needs the other documents as input, which is carried by
//! its own variant.

use indexmap::IndexMap;
use serde::Serialize;

/// Document label to generated Markdown, in output order.
pub type Documents = IndexMap<String, String>;

/// A prompt/template pairing that yields one labelled document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DocumentSpec {
    /// Label used as the result key (and, lowercased, as the file name).
    pub label: &'static str,
    /// Prompt template file name.
    pub prompt_template: &'static str,
    /// Documentation skeleton substituted into the prompt.
    pub doc_template: &'static str,
}

/// Documents generated concurrently against the cached context.
pub const DOCUMENTS: &[DocumentSpec] = &[
    DocumentSpec {
        label: "README",
        prompt_template: "readme-prompt-template.md",
        doc_template: "readme-documentation-template.md",
    },
    DocumentSpec {
        label: "AI Context",
        prompt_template: "ai-context-prompt-template.md",
        doc_template: "ai-context-documentation-template.md",
    },
    DocumentSpec {
        label: "DDD Refactoring",
        prompt_template: "ddd-refactoring-prompt-template.md",
        doc_template: "ddd-refactoring-template.md",
    },
    DocumentSpec {
        label: "Dictionary",
        prompt_template: "dictionary-prompt-template.md",
        doc_template: "dictionary-documentation-template.md",
    },
    DocumentSpec {
        label: "Quality Assessment",
        prompt_template: "quality-assessment-prompt-template.md",
        doc_template: "quality-assessment-documentation-template.md",
    },
    DocumentSpec {
        label: "Refactoring",
        prompt_template: "refactoring-prompt-template.md",
        doc_template: "refactoring-documentation-template.md",
    },
];

/// The final pass that critiques all other documents.
pub const EVALUATION: DocumentSpec = DocumentSpec {
    label: "Evaluation",
    prompt_template: "judge-validation-template.md",
    doc_template: "judge-documentation-template.md",
};

/// One unit of generation work.
#[derive(Debug, Clone)]
pub enum Strategy {
    /// A standalone document.
    Document(DocumentSpec),
    /// The evaluation document, which reviews `generated_docs`.
    Evaluation {
        spec: DocumentSpec,
        generated_docs: String,
    },
}

impl Strategy {
    /// The templates this strategy loads.
    pub fn spec(&self) -> &DocumentSpec {
        match self {
            Strategy::Document(spec) => spec,
            Strategy::Evaluation { spec, .. } => spec,
        }
    }

    /// Result key for this strategy.
    pub fn label(&self) -> &'static str {
        self.spec().label
    }

    /// Extra payload for the generated-documentation placeholder.
    pub fn generated_docs(&self) -> Option<&str> {
        match self {
            Strategy::Document(_) => None,
            Strategy::Evaluation { generated_docs, .. } => Some(generated_docs),
        }
    }
}

/// Every label the pipeline produces, in output order.
pub fn all_labels() -> Vec<&'static str> {
    DOCUMENTS
        .iter()
        .map(|d| d.label)
        .chain(std::iter::once(EVALUATION.label))
        .collect()
}
