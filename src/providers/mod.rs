//! GenerationProvider trait and model integration.
//!
//! Decouples the pipeline from the model vendor: the pipeline only needs
//! to upload a context cache, look existing caches up, and run prompts
//! against a cache.

pub mod gemini;

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the generation provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    #[error("invalid API response: {0}")]
    InvalidResponse(String),

    #[error("operation not supported by provider: {0}")]
    Unsupported(&'static str),

    #[error("provider not configured: {0}")]
    NotConfigured(String),
}

/// A remote cached-context entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheHandle {
    /// Server-side resource name (e.g. `cachedContents/abc123`).
    pub name: String,
    /// Identity key the cache was created with.
    pub display_name: Option<String>,
    /// Model resource the cache is bound to (e.g. `models/gemini-3-flash-preview`).
    #[serde(default)]
    pub model: Option<String>,
}

/// A model backend that supports context caching.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// List live caches. Providers without listing always re-create.
    async fn list_caches(&self) -> Result<Vec<CacheHandle>, ProviderError> {
        Err(ProviderError::Unsupported("listing cached contents"))
    }

    /// Model resource a reusable cache must be bound to. `None` accepts any.
    fn cache_model(&self) -> Option<String> {
        None
    }

    /// Upload `content` as a cache that lives for `ttl_seconds`, tagged with `key`.
    async fn create_cache(
        &self,
        content: &str,
        mime_type: &str,
        ttl_seconds: u64,
        key: &str,
    ) -> Result<CacheHandle, ProviderError>;

    /// Run `prompt`, optionally against a cache, and return the cleaned text.
    async fn generate_content(
        &self,
        prompt: &str,
        cache: Option<&CacheHandle>,
    ) -> Result<String, ProviderError>;
}

static ANALYSIS_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<analysis>.*?</analysis>").unwrap());

/// Remove `<analysis>` reasoning blocks and surrounding whitespace.
pub fn strip_analysis_blocks(text: &str) -> String {
    ANALYSIS_BLOCK.replace_all(text, "").trim().to_string()
}
