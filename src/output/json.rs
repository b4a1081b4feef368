//! JSON output renderer.
//!
//! Outputs `{"documents": {...}, "summary": {...}}` format.

use serde::Serialize;

use crate::models::Documents;
use crate::output::OutputRenderer;

/// Counts of generated versus failed documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub failed: usize,
}

impl Summary {
    pub fn from_documents(documents: &Documents) -> Self {
        Self {
            total: documents.len(),
            failed: documents.values().filter(|c| is_failed(c)).count(),
        }
    }
}

/// Whether `content` is a failed-strategy placeholder.
pub fn is_failed(content: &str) -> bool {
    content.starts_with("Error generating ")
}

/// JSON output renderer.
pub struct JsonRenderer;

impl OutputRenderer for JsonRenderer {
    fn render(&self, documents: &Documents) -> String {
        let output = serde_json::json!({
            "documents": documents,
            "summary": Summary::from_documents(documents),
        });

        serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
    }
}
