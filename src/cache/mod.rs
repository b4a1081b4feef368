//! Content-hash keyed remote context cache.
//!
//! The serialized context is uploaded once per distinct payload. Its
//! SHA-256 is stored as the cache's display name, so a later run over
//! unchanged content finds and reuses the live cache instead of paying
//! for a second upload. A cache bound to a different model is never
//! reused.

use sha2::{Digest, Sha256};

use crate::providers::{CacheHandle, GenerationProvider, ProviderError};

/// Compute the identity key of a context payload.
pub fn cache_key(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Find a live cache for `content`, or create one.
///
/// A listing failure (including providers that cannot list) only costs
/// the reuse: it is logged and a new cache is created. A creation
/// failure is returned to the caller.
pub async fn acquire(
    provider: &dyn GenerationProvider,
    content: &str,
    mime_type: &str,
    ttl_seconds: u64,
) -> Result<CacheHandle, ProviderError> {
    let key = cache_key(content);
    let short_key = &key[..8];
    let model = provider.cache_model();

    match provider.list_caches().await {
        Ok(caches) => {
            if let Some(existing) = caches
                .into_iter()
                .find(|c| {
                    c.display_name.as_deref() == Some(key.as_str()) && same_model(c, model.as_deref())
                })
            {
                tracing::info!(cache = %existing.name, key = short_key, "reusing context cache");
                return Ok(existing);
            }
        }
        Err(err) => tracing::warn!("failed to list existing caches: {err}"),
    }

    tracing::info!(key = short_key, "creating context cache");
    provider.create_cache(content, mime_type, ttl_seconds, &key).await
}

fn same_model(cache: &CacheHandle, model: Option<&str>) -> bool {
    match model {
        Some(model) => cache.model.as_deref() == Some(model),
        None => true,
    }
}
