//! Output: document files on disk and renderers for the generated set.

pub mod json;
pub mod markdown;
pub mod terminal;

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::models::Documents;

/// Errors while writing documents.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("failed to create output directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Trait for rendering a generated document set.
pub trait OutputRenderer {
    /// Render documents to a string.
    fn render(&self, documents: &Documents) -> String;
}

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// File name for a document label: lowercased, whitespace runs as `-`, `.md`.
pub fn document_filename(label: &str) -> String {
    format!("{}.md", WHITESPACE_RUN.replace_all(&label.to_lowercase(), "-"))
}

/// Relative output directories are taken relative to the project.
pub fn resolve_output_dir(project: &Path, output_dir: &Path) -> PathBuf {
    if output_dir.is_absolute() {
        output_dir.to_path_buf()
    } else {
        project.join(output_dir)
    }
}

/// Write one Markdown file per document into `dir`, creating it if needed.
///
/// Returns the written paths in document order.
pub async fn write_documents(dir: &Path, documents: &Documents) -> Result<Vec<PathBuf>, OutputError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| OutputError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;

    let mut written = Vec::with_capacity(documents.len());
    for (label, content) in documents {
        let path = dir.join(document_filename(label));
        tokio::fs::write(&path, content)
            .await
            .map_err(|source| OutputError::Write {
                path: path.clone(),
                source,
            })?;
        tracing::debug!(path = %path.display(), "wrote document");
        written.push(path);
    }
    Ok(written)
}
