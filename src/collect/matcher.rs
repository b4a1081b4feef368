//! `.gitignore`-style path filtering for the project walk.
//!
//! Only the root `.gitignore` is honoured. The version-control metadata
//! directory is always excluded, whatever the ignore file says.

use std::path::Path;

use ignore::gitignore::{Gitignore, GitignoreBuilder};

/// Name of the root ignore file.
pub const IGNORE_FILE: &str = ".gitignore";

/// Always-excluded version-control metadata directory.
pub const VCS_DIR: &str = ".git";

/// Predicate over project-relative paths.
#[derive(Debug, Clone)]
pub struct IgnoreMatcher {
    rules: Gitignore,
}

impl IgnoreMatcher {
    /// Load the root ignore file (if any) and add the `.git` exclusion.
    ///
    /// A missing ignore file is not an error. An unreadable file or an
    /// invalid pattern is logged and skipped; valid lines still apply.
    pub fn build(root: &Path) -> Self {
        let mut builder = GitignoreBuilder::new(root);

        let ignore_path = root.join(IGNORE_FILE);
        if ignore_path.is_file() {
            if let Some(err) = builder.add(&ignore_path) {
                tracing::warn!(path = %ignore_path.display(), "problem reading ignore rules: {err}");
            }
        }

        // Added last so a negation in the ignore file cannot re-include it.
        if let Err(err) = builder.add_line(None, VCS_DIR) {
            tracing::warn!("failed to add {VCS_DIR} exclusion: {err}");
        }

        let rules = match builder.build() {
            Ok(rules) => rules,
            Err(err) => {
                tracing::warn!(root = %root.display(), "ignore rules unusable, excluding only {VCS_DIR}: {err}");
                vcs_only(root)
            }
        };

        Self { rules }
    }

    /// Whether `relative` (a path under the root) is excluded.
    ///
    /// Evaluation problems fail open: the path is logged and kept.
    pub fn is_ignored(&self, relative: &Path, is_dir: bool) -> bool {
        if relative.has_root() {
            tracing::warn!(path = %relative.display(), "cannot evaluate ignore rules for a non-relative path");
            return false;
        }
        self.rules
            .matched_path_or_any_parents(relative, is_dir)
            .is_ignore()
    }

    /// Evaluate an absolute path found while walking `root`.
    pub fn is_ignored_under(&self, root: &Path, path: &Path, is_dir: bool) -> bool {
        match path.strip_prefix(root) {
            Ok(relative) if relative.as_os_str().is_empty() => false,
            Ok(relative) => self.is_ignored(relative, is_dir),
            Err(err) => {
                tracing::warn!(path = %path.display(), "error checking ignore for path: {err}");
                false
            }
        }
    }
}

fn vcs_only(root: &Path) -> Gitignore {
    let mut builder = GitignoreBuilder::new(root);
    if builder.add_line(None, VCS_DIR).is_err() {
        return Gitignore::empty();
    }
    builder.build().unwrap_or_else(|_| Gitignore::empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher_with(rules: &str) -> (tempfile::TempDir, IgnoreMatcher) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(IGNORE_FILE), rules).unwrap();
        let matcher = IgnoreMatcher::build(dir.path());
        (dir, matcher)
    }

    #[test]
    fn missing_ignore_file_still_excludes_git() {
        let dir = tempfile::tempdir().unwrap();
        let matcher = IgnoreMatcher::build(dir.path());
        assert!(matcher.is_ignored(Path::new(".git"), true));
        assert!(matcher.is_ignored(Path::new(".git/config"), false));
        assert!(!matcher.is_ignored(Path::new("src/main.rs"), false));
    }

    #[test]
    fn patterns_from_root_ignore_file_apply() {
        let (_dir, matcher) = matcher_with("target/\n*.log\n");
        assert!(matcher.is_ignored(Path::new("target"), true));
        assert!(matcher.is_ignored(Path::new("target/debug/app"), false));
        assert!(matcher.is_ignored(Path::new("logs/run.log"), false));
        assert!(!matcher.is_ignored(Path::new("src/log.rs"), false));
    }

    #[test]
    fn negation_re_includes_later_match() {
        let (_dir, matcher) = matcher_with("*.md\n!README.md\n");
        assert!(matcher.is_ignored(Path::new("NOTES.md"), false));
        assert!(!matcher.is_ignored(Path::new("README.md"), false));
    }

    #[test]
    fn negation_cannot_re_include_git_dir() {
        let (_dir, matcher) = matcher_with("!.git\n");
        assert!(matcher.is_ignored(Path::new(".git"), true));
    }

    #[test]
    fn absolute_path_fails_open() {
        let dir = tempfile::tempdir().unwrap();
        let matcher = IgnoreMatcher::build(dir.path());
        assert!(!matcher.is_ignored(Path::new("/etc/.git"), true));
    }

    #[test]
    fn path_outside_root_fails_open() {
        let dir = tempfile::tempdir().unwrap();
        let matcher = IgnoreMatcher::build(dir.path());
        assert!(!matcher.is_ignored_under(dir.path(), Path::new("/elsewhere/.git"), true));
    }
}
