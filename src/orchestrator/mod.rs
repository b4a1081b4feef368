//! Generation pipeline: context cache, concurrent document strategies,
//! and the final evaluation pass.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinSet;

use crate::cache;
use crate::constants::CONTEXT_MIME_TYPE;
use crate::context::{self, ContextError};
use crate::debug::DebugSink;
use crate::models::{DOCUMENTS, Documents, EVALUATION, RepositoryContext, Strategy};
use crate::prompts::PromptLibrary;
use crate::providers::{CacheHandle, GenerationProvider, ProviderError};

/// Errors that abort a whole run.
///
/// Individual strategy failures never surface here; they become
/// placeholder documents in the result map.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Context(#[from] ContextError),

    #[error("failed to create context cache: {0}")]
    Cache(#[source] ProviderError),
}

/// Runs every document strategy against one cached repository context.
pub struct GenerationPipeline {
    provider: Arc<dyn GenerationProvider>,
    prompts: Arc<PromptLibrary>,
    sink: Arc<dyn DebugSink>,
    ttl_seconds: u64,
}

impl GenerationPipeline {
    pub fn new(
        provider: Arc<dyn GenerationProvider>,
        prompts: PromptLibrary,
        sink: Arc<dyn DebugSink>,
        ttl_seconds: u64,
    ) -> Self {
        Self {
            provider,
            prompts: Arc::new(prompts),
            sink,
            ttl_seconds,
        }
    }

    /// Generate all documents for `context`.
    ///
    /// The cache is acquired before any strategy starts. The document
    /// strategies then run concurrently and are all awaited; the
    /// evaluation runs last over their output. The returned map always
    /// holds one entry per label, failed ones as `Error generating ...`.
    pub async fn run(
        &self,
        context: &RepositoryContext,
        target_language: Option<&str>,
    ) -> Result<Documents, PipelineError> {
        let payload = context::assemble(context)?;
        self.sink.record("ai_cache_content", "md", &payload);

        let handle = cache::acquire(
            self.provider.as_ref(),
            &payload,
            CONTEXT_MIME_TYPE,
            self.ttl_seconds,
        )
        .await
        .map_err(PipelineError::Cache)?;
        let handle = Arc::new(handle);
        let language = target_language.map(str::to_string);

        let mut join_set = JoinSet::new();
        for spec in DOCUMENTS {
            let worker = self.worker(Arc::clone(&handle), language.clone());
            let label = spec.label;
            join_set.spawn(async move { (label, worker.run(Strategy::Document(*spec)).await) });
        }

        let mut finished: HashMap<&'static str, String> = HashMap::new();
        while let Some(result) = join_set.join_next().await {
            match result {
                Ok((label, text)) => {
                    finished.insert(label, text);
                }
                Err(err) => tracing::error!("document task panicked: {err}"),
            }
        }

        let mut documents = Documents::new();
        for spec in DOCUMENTS {
            let text = finished
                .remove(spec.label)
                .unwrap_or_else(|| error_document(spec.label, "task did not complete"));
            documents.insert(spec.label.to_string(), text);
        }

        let evaluation = Strategy::Evaluation {
            spec: EVALUATION,
            generated_docs: evaluation_payload(&documents),
        };
        let text = self.worker(handle, language).run(evaluation).await;
        documents.insert(EVALUATION.label.to_string(), text);

        Ok(documents)
    }

    fn worker(&self, cache: Arc<CacheHandle>, language: Option<String>) -> StrategyWorker {
        StrategyWorker {
            provider: Arc::clone(&self.provider),
            prompts: Arc::clone(&self.prompts),
            sink: Arc::clone(&self.sink),
            cache,
            language,
        }
    }
}

/// Everything one strategy needs, owned so it can move into a task.
struct StrategyWorker {
    provider: Arc<dyn GenerationProvider>,
    prompts: Arc<PromptLibrary>,
    sink: Arc<dyn DebugSink>,
    cache: Arc<CacheHandle>,
    language: Option<String>,
}

impl StrategyWorker {
    /// One prompt/response round trip. Never fails.
    async fn run(self, strategy: Strategy) -> String {
        let label = strategy.label();
        match self.generate(&strategy).await {
            Ok(text) => {
                tracing::info!(document = label, chars = text.len(), "document generated");
                text
            }
            Err(err) => {
                tracing::error!(document = label, "generation failed: {err}");
                error_document(label, &err.to_string())
            }
        }
    }

    async fn generate(&self, strategy: &Strategy) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let prompt = self
            .prompts
            .build_prompt(strategy, self.language.as_deref(), Some(&self.cache), self.sink.as_ref())
            .await?;
        self.sink.record("ai_prompt", "md", &prompt);
        Ok(self.provider.generate_content(&prompt, Some(&self.cache)).await?)
    }
}

/// Placeholder content for a strategy that failed.
pub fn error_document(label: &str, message: &str) -> String {
    format!("Error generating {label}: {message}")
}

/// The generated documents as `<document>` blocks, in map order.
pub fn evaluation_payload(documents: &Documents) -> String {
    documents
        .iter()
        .map(|(label, content)| format!("<document name=\"{label}\">\n{content}\n</document>"))
        .collect::<Vec<_>>()
        .join("\n\n")
}
