//! Commit history types.

use serde::{Deserialize, Serialize};

/// How a file was touched by a commit.
///
/// Numstat output does not reliably tell adds, deletes and renames apart,
/// so the history parser only ever produces [`ChangeKind::Modify`].
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ChangeKind {
    Add,
    Delete,
    #[default]
    Modify,
    Rename,
    Unknown,
}

/// A single file touched by a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    pub kind: ChangeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_path: Option<String>,
    pub new_path: String,
    /// Zero for binary files.
    pub lines_added: u64,
    /// Zero for binary files.
    pub lines_deleted: u64,
}

/// One parsed commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub id: String,
    pub short_id: String,
    pub author_name: String,
    pub author_email: String,
    /// ISO-8601-like author time exactly as emitted by git.
    pub author_time: String,
    pub subject: String,
    pub body: String,
    pub changes: Vec<FileChange>,
    /// Always equals `changes.len()`.
    pub files_changed: usize,
    pub insertions: u64,
    pub deletions: u64,
}

/// Per-file churn accumulated across the inspected commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStat {
    pub path: String,
    pub commits: usize,
    pub lines_added: u64,
    pub lines_deleted: u64,
}

impl FileStat {
    /// A zeroed entry for `path`.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            commits: 0,
            lines_added: 0,
            lines_deleted: 0,
        }
    }
}

/// Parsed commits plus the hotspot ranking derived from them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitHistory {
    pub commits: Vec<CommitRecord>,
    pub hotspots: Vec<FileStat>,
}

impl CommitHistory {
    /// Whether nothing was collected (no repository, or no commits).
    pub fn is_empty(&self) -> bool {
        self.commits.is_empty() && self.hotspots.is_empty()
    }
}
