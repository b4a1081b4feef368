//! Git CLI wrapper for commit history and branch detection.
//!
//! Shells out to `git` via `tokio::process::Command`.

use std::path::Path;

use super::HistoryError;
use crate::env::Env;

/// Marker emitted before every commit.
pub const COMMIT_DELIMITER: &str = "<<<COMMIT_START>>>";

/// Marker separating a commit's header block from its numstat lines.
pub const HEADER_END_DELIMITER: &str = "<<<HEADER_END>>>";

/// The `--format` value the history parser depends on.
///
/// Header lines, in order: full hash, short hash, author name, author
/// email, strict ISO-8601 author date, subject, then the body.
pub fn log_format() -> String {
    format!("--format={COMMIT_DELIMITER}%n%H%n%h%n%an%n%ae%n%aI%n%s%n%b%n{HEADER_END_DELIMITER}")
}

/// Run `git log` for the newest `limit` non-merge commits with numstat.
pub async fn git_log(repo_root: &Path, limit: usize) -> Result<String, HistoryError> {
    let limit = limit.to_string();
    let format = log_format();
    let output = tokio::process::Command::new("git")
        .args(["log", &format, "--numstat", "--no-merges", "-n", &limit])
        .current_dir(repo_root)
        .output()
        .await
        .map_err(|e| HistoryError::GitError(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(HistoryError::GitError(format!(
            "git log failed ({}): {}",
            output.status,
            stderr.trim()
        )));
    }

    // Commit messages are not guaranteed to be UTF-8; keep what we can.
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Detect the current branch name.
///
/// Tries, in order:
/// 1. `git rev-parse --abbrev-ref HEAD` (returns `HEAD` when detached)
/// 2. CI-specific environment variables (`GITHUB_HEAD_REF`, `GITHUB_REF_NAME`,
///    `CI_COMMIT_BRANCH`, `BITBUCKET_BRANCH`, `CI_BRANCH`)
/// 3. Returns `None` when nothing is available.
pub async fn detect_branch(repo_root: &Path, env: &Env) -> Option<String> {
    if let Ok(output) = tokio::process::Command::new("git")
        .args(["rev-parse", "--abbrev-ref", "HEAD"])
        .current_dir(repo_root)
        .output()
        .await
    {
        if output.status.success() {
            let branch = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if !branch.is_empty() && branch != "HEAD" {
                return Some(branch);
            }
        }
    }

    // Detached HEAD is common in CI.
    env.first_of(&[
        "GITHUB_HEAD_REF",
        "GITHUB_REF_NAME",
        "CI_COMMIT_BRANCH",
        "BITBUCKET_BRANCH",
        "CI_BRANCH",
    ])
}

#[cfg(test)]
pub(crate) mod testing {
    //! Helpers for building throwaway repositories in tests.

    use std::path::Path;

    pub async fn git(dir: &Path, args: &[&str]) {
        let status = tokio::process::Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .await
            .unwrap();
        assert!(status.status.success(), "git {args:?} failed: {status:?}");
    }

    pub async fn init_repo(dir: &Path, branch: &str) {
        git(dir, &["init", "-b", branch]).await;
        git(dir, &["config", "user.email", "dev@example.com"]).await;
        git(dir, &["config", "user.name", "Dev Example"]).await;
        git(dir, &["config", "commit.gpgsign", "false"]).await;
    }

    pub async fn commit_file(dir: &Path, rel: &str, content: &str, message: &str) {
        let path = dir.join(rel);
        tokio::fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        tokio::fs::write(&path, content).await.unwrap();
        git(dir, &["add", "."]).await;
        git(dir, &["commit", "-m", message]).await;
    }
}
