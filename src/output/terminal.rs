//! Terminal renderer: one status line per document.

use colored::Colorize;

use crate::models::Documents;
use crate::output::OutputRenderer;
use crate::output::json::{Summary, is_failed};

/// Compact colored status listing, meant for stderr.
pub struct TerminalRenderer;

impl OutputRenderer for TerminalRenderer {
    fn render(&self, documents: &Documents) -> String {
        let mut output = String::new();

        for (label, content) in documents {
            if is_failed(content) {
                output.push_str(&format!(" {} {}\n", "✖".red().bold(), label.bold()));
                output.push_str(&format!("   {}\n", content.dimmed()));
            } else {
                output.push_str(&format!(
                    " {} {} {}\n",
                    "✔".green().bold(),
                    label.bold(),
                    format!("({} chars)", content.chars().count()).dimmed()
                ));
            }
        }

        let summary = Summary::from_documents(documents);
        output.push_str(&format!("{}\n", "───────────────────────────────────".dimmed()));
        output.push_str(&format!(
            " {} documents, {} failed\n",
            summary.total.to_string().bold(),
            if summary.failed == 0 {
                summary.failed.to_string().green().bold()
            } else {
                summary.failed.to_string().red().bold()
            },
        ));

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_mixed_results() {
        let mut documents = Documents::new();
        documents.insert("README".into(), "# Demo".into());
        documents.insert("Refactoring".into(), "Error generating Refactoring: boom".into());

        let output = TerminalRenderer.render(&documents);
        // May be wrapped in ANSI color codes
        assert!(output.contains("README"));
        assert!(output.contains("(6 chars)"));
        assert!(output.contains("Error generating Refactoring: boom"));
        assert!(output.contains("documents"));
    }
}
