//! Repository context types.

use serde::{Deserialize, Serialize};

use super::history::{CommitRecord, FileStat};

/// One collected text file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Path relative to the project root, `/`-separated.
    pub path: String,
    /// Full UTF-8 content.
    pub content: String,
}

/// Everything gathered about a project for one analysis run.
///
/// Built once, then shared read-only with every document strategy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepositoryContext {
    pub project_name: String,
    /// Author time of the newest commit, or the collection time when
    /// the project has no history.
    pub timestamp: String,
    pub branch: String,
    /// Rendered directory tree.
    pub tree: String,
    /// Collected files in sorted path order.
    pub files: Vec<FileEntry>,
    /// Churn ranking, most-touched first.
    pub hotspots: Vec<FileStat>,
    /// Commits in log order (newest first).
    pub commits: Vec<CommitRecord>,
}
