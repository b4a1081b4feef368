//! Project content collection: ignore-aware walk, text classification,
//! file corpus loading, and directory tree rendering.

pub mod classify;
pub mod matcher;
pub mod tree;
pub mod walker;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::FileEntry;

pub use matcher::IgnoreMatcher;

/// Errors from content collection.
#[derive(Error, Debug)]
pub enum CollectError {
    #[error("failed to walk {}: {source}", root.display())]
    Walk {
        root: PathBuf,
        source: walkdir::Error,
    },
}

/// The sorted file list of a project, shared by the corpus and the tree
/// so both see the same inclusion decisions.
#[derive(Debug, Clone)]
pub struct ProjectFiles {
    root: PathBuf,
    files: Vec<PathBuf>,
}

impl ProjectFiles {
    /// Walk `root` with its ignore rules.
    pub fn scan(root: &Path) -> Result<Self, CollectError> {
        let matcher = IgnoreMatcher::build(root);
        let files = walker::walk(root, &matcher)?;
        Ok(Self {
            root: root.to_path_buf(),
            files,
        })
    }

    /// Absolute paths, sorted.
    pub fn paths(&self) -> &[PathBuf] {
        &self.files
    }

    /// `/`-separated relative paths, in the same order.
    pub fn relative_paths(&self) -> Vec<String> {
        self.files
            .iter()
            .filter_map(|f| walker::relative_path(&self.root, f))
            .collect()
    }

    /// Render the directory tree of every walked file.
    pub fn tree(&self) -> String {
        tree::render(&self.relative_paths())
    }

    /// Load the text corpus.
    ///
    /// Without `include_tests`, any path whose lowercase form contains
    /// `test` is dropped. That is deliberately blunt: `latest.rs`,
    /// `tests/` and `contest.md` all match. Binary files are skipped.
    /// Text in a legacy encoding is decoded lossily; only files that
    /// cannot be read at all are logged and skipped.
    pub async fn load(&self, include_tests: bool) -> Vec<FileEntry> {
        let mut entries = Vec::new();

        for file in &self.files {
            let Some(relative) = walker::relative_path(&self.root, file) else {
                continue;
            };

            if !include_tests && looks_like_test(&relative) {
                continue;
            }

            if !classify::is_text(file).await {
                continue;
            }

            match tokio::fs::read(file).await {
                Ok(bytes) => entries.push(FileEntry {
                    path: relative,
                    content: String::from_utf8_lossy(&bytes).into_owned(),
                }),
                Err(err) => {
                    tracing::warn!(path = %file.display(), "failed to read file: {err}");
                }
            }
        }

        entries
    }
}

/// Walk `root` and load its text corpus in one step.
pub async fn collect_files(root: &Path, include_tests: bool) -> Result<Vec<FileEntry>, CollectError> {
    Ok(ProjectFiles::scan(root)?.load(include_tests).await)
}

fn looks_like_test(relative: &str) -> bool {
    relative.to_lowercase().contains("test")
}
