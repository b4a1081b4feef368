//! App-wide constants.
//!
//! Centralises the tool name, config paths, environment variable names,
//! and defaults so a rename only requires changing this file.

/// Display name of the tool (lowercase).
pub const APP_NAME: &str = "repo-onboarder";

/// Crate version, baked in at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Compilation target triple (exported by `build.rs`).
pub const TARGET: &str = env!("TARGET");

/// Local config filename (e.g. `.repo-onboarder.toml` in the project root).
pub const CONFIG_FILENAME: &str = ".repo-onboarder.toml";

/// Directory name under `~/.config/` for global config.
pub const CONFIG_DIR: &str = "repo-onboarder";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Gemini REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Number of non-merge commits inspected per run.
pub const DEFAULT_COMMIT_LIMIT: usize = 50;

/// Lifetime of a remote context cache.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 600;

/// MIME type used when uploading the context payload.
pub const CONTEXT_MIME_TYPE: &str = "text/plain";

/// Directory (relative to the working directory) the debug sink writes to.
pub const DEFAULT_DEBUG_DIR: &str = "debug";

// ── Environment variable names ──────────────────────────────────────

pub const ENV_API_KEY: &str = "ONBOARDER_API_KEY";
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_MODEL: &str = "ONBOARDER_MODEL";
pub const ENV_GEMINI_MODEL: &str = "GEMINI_MODEL";
pub const ENV_BASE_URL: &str = "ONBOARDER_BASE_URL";
pub const ENV_DEBUG: &str = "ONBOARDER_DEBUG";
