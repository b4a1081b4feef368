//! Repository context assembly.
//!
//! Gathers everything the model needs to know about a project (text
//! corpus, directory tree, commit history, hotspots) into a
//! [`RepositoryContext`], and serializes it to the XML payload that is
//! uploaded as cached context.

pub mod assembler;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::collect::{CollectError, ProjectFiles};
use crate::config::AnalysisConfig;
use crate::debug::DebugSink;
use crate::env::Env;
use crate::history::{self, git};
use crate::models::RepositoryContext;

pub use assembler::{assemble, sanitize};

/// Fallback branch name when none is configured or detectable.
pub const FALLBACK_BRANCH: &str = "HEAD";

/// Errors from context assembly.
#[derive(Error, Debug)]
pub enum ContextError {
    #[error("project path does not exist or is not a directory: {}", .0.display())]
    InvalidPath(PathBuf),

    #[error(transparent)]
    Collect(#[from] CollectError),

    #[error("failed to serialize context payload: {0}")]
    Xml(String),
}

/// Collect the full context of the project at `root`.
///
/// The directory is walked once; the corpus and the tree are derived from
/// the same file list. A project without git history still yields a
/// context, timestamped with the collection time.
pub async fn build_repository_context(
    root: &Path,
    analysis: &AnalysisConfig,
    env: &Env,
    sink: &dyn DebugSink,
) -> Result<RepositoryContext, ContextError> {
    if !root.is_dir() {
        return Err(ContextError::InvalidPath(root.to_path_buf()));
    }

    let project_files = ProjectFiles::scan(root)?;
    let files = project_files.load(analysis.include_tests).await;
    tracing::info!(files = files.len(), "collected project files");

    match serde_json::to_string_pretty(&files) {
        Ok(json) => sink.record("repo_snapshot", "json", &json),
        Err(err) => tracing::warn!("failed to serialize repo snapshot: {err}"),
    }

    let tree = project_files.tree();
    let history = history::collect_history(root, analysis.commit_limit).await;
    tracing::info!(
        commits = history.commits.len(),
        hotspots = history.hotspots.len(),
        "collected commit history"
    );

    let timestamp = history
        .commits
        .first()
        .map(|c| c.author_time.clone())
        .unwrap_or_else(collection_timestamp);

    let branch = match &analysis.branch {
        Some(branch) => branch.clone(),
        None => git::detect_branch(root, env)
            .await
            .unwrap_or_else(|| FALLBACK_BRANCH.to_string()),
    };

    Ok(RepositoryContext {
        project_name: project_name(root),
        timestamp,
        branch,
        tree,
        files,
        hotspots: history.hotspots,
        commits: history.commits,
    })
}

/// Final path component of `root`, resolving `.` and friends first.
pub fn project_name(root: &Path) -> String {
    let resolved = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
    resolved
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| resolved.display().to_string())
}

/// Current time in a filename-safe ISO form (`:` and `.` become `-`).
fn collection_timestamp() -> String {
    chrono::Utc::now()
        .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
        .replace([':', '.'], "-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debug::{DirectorySink, NoopSink};
    use crate::history::git::testing::{commit_file, init_repo};

    fn no_env() -> Env {
        Env::mock(Vec::<(&str, &str)>::new())
    }

    #[tokio::test]
    async fn missing_path_is_an_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = build_repository_context(
            &dir.path().join("nope"),
            &AnalysisConfig::default(),
            &no_env(),
            &NoopSink,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ContextError::InvalidPath(_)));
    }

    #[tokio::test]
    async fn plain_directory_uses_fallbacks() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("main.py"), "print('hi')\n").unwrap();

        let context = build_repository_context(dir.path(), &AnalysisConfig::default(), &no_env(), &NoopSink)
            .await
            .unwrap();

        assert_eq!(context.branch, FALLBACK_BRANCH);
        assert!(context.commits.is_empty());
        assert!(!context.timestamp.contains(':'));
        assert!(!context.timestamp.contains('.'));
        assert_eq!(context.files.len(), 1);
        assert_eq!(context.tree, "└── main.py\n");
        assert_eq!(context.project_name, project_name(dir.path()));
    }

    #[tokio::test]
    async fn git_project_takes_newest_commit_time_and_branch() {
        let dir = tempfile::tempdir().unwrap();
        init_repo(dir.path(), "trunk").await;
        commit_file(dir.path(), "lib.rs", "fn a() {}\n", "first").await;
        commit_file(dir.path(), "lib.rs", "fn b() {}\n", "second").await;

        let context = build_repository_context(dir.path(), &AnalysisConfig::default(), &no_env(), &NoopSink)
            .await
            .unwrap();

        assert_eq!(context.branch, "trunk");
        assert_eq!(context.commits.len(), 2);
        assert_eq!(context.timestamp, context.commits[0].author_time);
        assert_eq!(context.hotspots[0].path, "lib.rs");
        assert_eq!(context.hotspots[0].commits, 2);
    }

    #[tokio::test]
    async fn configured_branch_wins() {
        let dir = tempfile::tempdir().unwrap();
        let analysis = AnalysisConfig {
            branch: Some("release".into()),
            ..AnalysisConfig::default()
        };
        let context = build_repository_context(dir.path(), &analysis, &no_env(), &NoopSink)
            .await
            .unwrap();
        assert_eq!(context.branch, "release");
    }

    #[tokio::test]
    async fn snapshot_is_recorded_to_debug_sink() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("project");
        std::fs::create_dir(&project).unwrap();
        std::fs::write(project.join("a.txt"), "alpha").unwrap();
        let sink = DirectorySink::new(dir.path().join("debug"));

        build_repository_context(&project, &AnalysisConfig::default(), &no_env(), &sink)
            .await
            .unwrap();

        let snapshot = std::fs::read_to_string(dir.path().join("debug/repo_snapshot.json")).unwrap();
        assert!(snapshot.contains("\"a.txt\""));
        assert!(snapshot.contains("alpha"));
    }

    #[test]
    fn project_name_is_basename() {
        assert_eq!(project_name(Path::new("/nonexistent/some/proj")), "proj");
    }
}
