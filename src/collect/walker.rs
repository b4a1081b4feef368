//! Recursive project walk honouring the ignore rules.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::CollectError;
use super::matcher::IgnoreMatcher;

/// List every non-ignored file under `root`, sorted.
///
/// Ignored directories are pruned without being descended into.
/// Directories themselves are never returned.
pub fn walk(root: &Path, matcher: &IgnoreMatcher) -> Result<Vec<PathBuf>, CollectError> {
    let mut files = Vec::new();

    let entries = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !matcher.is_ignored_under(root, entry.path(), entry.file_type().is_dir())
        });

    for entry in entries {
        let entry = entry.map_err(|source| CollectError::Walk {
            root: root.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_dir() {
            continue;
        }
        files.push(entry.into_path());
    }

    files.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
    Ok(files)
}

/// `/`-separated form of `path` relative to `root`.
///
/// Returns `None` for paths outside `root`.
pub fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}
