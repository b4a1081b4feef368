//! Configuration loading and layering.
//!
//! Handles `.repo-onboarder.toml` loading, environment variable resolution,
//! and CLI flag merging with proper priority ordering.

pub mod loader;

pub use loader::{AnalysisConfig, CacheConfig, Config, ConfigError, DebugConfig, PromptsConfig, ProviderConfig};
