//! Gemini REST client with context caching.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{CacheHandle, GenerationProvider, ProviderError, strip_analysis_blocks};
use crate::config::ProviderConfig;

/// Long prompts against a large cached context can take minutes.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Page size used when listing cached contents.
const LIST_PAGE_SIZE: u32 = 100;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
enum Part<'a> {
    Text(&'a str),
    InlineData(InlineData<'a>),
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateCacheRequest<'a> {
    model: String,
    display_name: &'a str,
    contents: Vec<Content<'a>>,
    ttl: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cached_content: Option<&'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CachedContent {
    name: Option<String>,
    display_name: Option<String>,
    model: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct ListCachesResponse {
    cached_contents: Vec<CachedContent>,
    next_page_token: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct CandidateContent {
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ResponsePart {
    text: Option<String>,
}

/// Gemini API client.
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiProvider {
    /// Create a client from provider configuration.
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ProviderError::NotConfigured("no API key".to_string()))?;

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            base_url: config.base_url().trim_end_matches('/').to_string(),
        })
    }

    /// Fully qualified model resource name.
    fn model_resource(&self) -> String {
        if self.model.starts_with("models/") {
            self.model.clone()
        } else {
            format!("models/{}", self.model)
        }
    }

    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, ProviderError> {
        let response = builder
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_else(|e| {
                debug!("failed to read error response body: {e}");
                String::new()
            });
            return Err(ProviderError::Api { status, body });
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }
}

fn content_part<'a>(content: &'a str, mime_type: &'a str) -> Part<'a> {
    if mime_type.starts_with("text/") {
        Part::Text(content)
    } else {
        Part::InlineData(InlineData {
            mime_type,
            data: BASE64.encode(content.as_bytes()),
        })
    }
}

#[async_trait]
impl GenerationProvider for GeminiProvider {
    async fn list_caches(&self) -> Result<Vec<CacheHandle>, ProviderError> {
        let url = format!("{}/cachedContents", self.base_url);
        let mut handles = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut builder = self
                .client
                .get(&url)
                .query(&[("pageSize", LIST_PAGE_SIZE.to_string())]);
            if let Some(token) = &page_token {
                builder = builder.query(&[("pageToken", token)]);
            }

            let page: ListCachesResponse = self.send(builder).await?;
            handles.extend(page.cached_contents.into_iter().filter_map(|c| {
                c.name.map(|name| CacheHandle {
                    name,
                    display_name: c.display_name,
                    model: c.model,
                })
            }));

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(count = handles.len(), "listed cached contents");
        Ok(handles)
    }

    fn cache_model(&self) -> Option<String> {
        Some(self.model_resource())
    }

    async fn create_cache(
        &self,
        content: &str,
        mime_type: &str,
        ttl_seconds: u64,
        key: &str,
    ) -> Result<CacheHandle, ProviderError> {
        let request = CreateCacheRequest {
            model: self.model_resource(),
            display_name: key,
            contents: vec![Content {
                role: "user",
                parts: vec![content_part(content, mime_type)],
            }],
            ttl: format!("{ttl_seconds}s"),
        };

        info!(model = %self.model, bytes = content.len(), ttl_seconds, "creating context cache");
        let builder = self
            .client
            .post(format!("{}/cachedContents", self.base_url))
            .json(&request);
        let created: CachedContent = self.send(builder).await?;

        let name = created
            .name
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ProviderError::InvalidResponse("cache name is missing".to_string()))?;
        Ok(CacheHandle {
            name,
            display_name: created.display_name.or_else(|| Some(key.to_string())),
            model: created.model.or_else(|| Some(self.model_resource())),
        })
    }

    async fn generate_content(
        &self,
        prompt: &str,
        cache: Option<&CacheHandle>,
    ) -> Result<String, ProviderError> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part::Text(prompt)],
            }],
            cached_content: cache.map(|c| c.name.as_str()),
        };

        debug!(
            model = %self.model,
            prompt_len = prompt.len(),
            cached = cache.is_some(),
            "sending generateContent request"
        );
        let builder = self
            .client
            .post(format!("{}/{}:generateContent", self.base_url, self.model_resource()))
            .json(&request);
        let response: GenerateResponse = self.send(builder).await?;

        let text: String = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .ok_or_else(|| ProviderError::InvalidResponse("no candidate content in response".to_string()))?;

        Ok(strip_analysis_blocks(&text))
    }
}
