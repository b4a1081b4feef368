//! Commit history collection and churn ("hotspot") aggregation.
//!
//! Runs `git log` with a delimiter-based format plus `--numstat`, then
//! parses the raw output into [`CommitRecord`]s and per-file [`FileStat`]s.

pub mod git;

use std::path::Path;

use indexmap::IndexMap;
use thiserror::Error;

use crate::models::{ChangeKind, CommitHistory, CommitRecord, FileChange, FileStat};

use git::{COMMIT_DELIMITER, HEADER_END_DELIMITER};

/// Errors from the history collector.
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("git command failed: {0}")]
    GitError(String),
}

/// Number of positional header lines before the body.
const HEADER_FIELDS: usize = 6;

/// Numstat's marker for a count it cannot compute (binary files).
const NOT_COUNTABLE: &str = "-";

/// Collect the newest `limit` non-merge commits of `repo_root`.
///
/// Never fails: when git is unavailable or `repo_root` is not a
/// repository, an empty history is returned so documentation can still
/// be generated.
pub async fn collect_history(repo_root: &Path, limit: usize) -> CommitHistory {
    match git::git_log(repo_root, limit).await {
        Ok(raw) => parse_log(&raw),
        Err(err) => {
            tracing::warn!(path = %repo_root.display(), "failed to fetch git log, using empty history: {err}");
            CommitHistory::default()
        }
    }
}

/// Parse raw `git log` output produced with [`git::log_format`].
///
/// Commits keep log order. Chunks without a header marker or with fewer
/// than six header lines are dropped. Hotspots are sorted by commit count,
/// highest first; ties have no guaranteed order.
pub fn parse_log(raw: &str) -> CommitHistory {
    let mut commits = Vec::new();
    let mut stats: IndexMap<String, FileStat> = IndexMap::new();

    for chunk in raw.split(COMMIT_DELIMITER) {
        if chunk.trim().is_empty() {
            continue;
        }
        if let Some(commit) = parse_chunk(chunk, &mut stats) {
            commits.push(commit);
        }
    }

    let mut hotspots: Vec<FileStat> = stats.into_values().collect();
    hotspots.sort_by(|a, b| b.commits.cmp(&a.commits));

    CommitHistory { commits, hotspots }
}

fn parse_chunk(chunk: &str, stats: &mut IndexMap<String, FileStat>) -> Option<CommitRecord> {
    let (header, diff) = chunk.split_once(HEADER_END_DELIMITER)?;

    let lines: Vec<&str> = header
        .trim()
        .lines()
        .map(|l| l.trim_end_matches('\r'))
        .collect();
    if lines.len() < HEADER_FIELDS {
        return None;
    }

    let mut changes = Vec::new();
    let mut insertions = 0;
    let mut deletions = 0;

    for line in diff.trim().lines() {
        let Some(change) = parse_numstat_line(line) else {
            continue;
        };

        insertions += change.lines_added;
        deletions += change.lines_deleted;

        let stat = stats
            .entry(change.new_path.clone())
            .or_insert_with(|| FileStat::new(change.new_path.clone()));
        stat.commits += 1;
        stat.lines_added += change.lines_added;
        stat.lines_deleted += change.lines_deleted;

        changes.push(change);
    }

    Some(CommitRecord {
        id: lines[0].to_string(),
        short_id: lines[1].to_string(),
        author_name: lines[2].to_string(),
        author_email: lines[3].to_string(),
        author_time: lines[4].to_string(),
        subject: lines[5].to_string(),
        body: lines[HEADER_FIELDS..].join("\n"),
        files_changed: changes.len(),
        changes,
        insertions,
        deletions,
    })
}

/// Parse `added<TAB>deleted<TAB>path`.
///
/// Renames stay in git's `{old => new}` notation as a single path.
fn parse_numstat_line(line: &str) -> Option<FileChange> {
    let mut fields = line.trim_end_matches('\r').splitn(3, '\t');
    let added = fields.next()?;
    let deleted = fields.next()?;
    let path = fields.next()?;

    Some(FileChange {
        kind: ChangeKind::Modify,
        old_path: None,
        new_path: path.to_string(),
        lines_added: parse_count(added),
        lines_deleted: parse_count(deleted),
    })
}

fn parse_count(field: &str) -> u64 {
    let field = field.trim();
    if field == NOT_COUNTABLE {
        return 0;
    }
    field.parse().unwrap_or(0)
}
