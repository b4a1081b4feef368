//! Optional debug side channel.
//!
//! Components hand intermediate artefacts (collected files, the context
//! payload, prepared prompts) to a [`DebugSink`]. The default sink drops
//! them; `--debug` swaps in a [`DirectorySink`] that writes each artefact
//! to its own file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Receiver for debug artefacts. Must never fail the caller.
pub trait DebugSink: Send + Sync {
    /// Record `content` under `name` (without extension).
    fn record(&self, name: &str, extension: &str, content: &str);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl DebugSink for NoopSink {
    fn record(&self, _name: &str, _extension: &str, _content: &str) {}
}

/// Writes `<dir>/<name>.<extension>`, overwriting previous runs.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DebugSink for DirectorySink {
    fn record(&self, name: &str, extension: &str, content: &str) {
        if let Err(err) = std::fs::create_dir_all(&self.dir) {
            tracing::warn!(dir = %self.dir.display(), "failed to create debug directory: {err}");
            return;
        }
        let path = self.dir.join(format!("{name}.{extension}"));
        if let Err(err) = std::fs::write(&path, content) {
            tracing::warn!(path = %path.display(), "failed to write debug artefact: {err}");
        }
    }
}

/// Pick the sink for a run from the single debug switch.
pub fn sink_for(enabled: bool, dir: &Path) -> Arc<dyn DebugSink> {
    if enabled {
        Arc::new(DirectorySink::new(dir))
    } else {
        Arc::new(NoopSink)
    }
}
