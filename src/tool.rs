//! The `generateDocumentation` tool surface.
//!
//! Takes a repository path and options, runs collection and generation,
//! and reports the outcome as text. Caller-facing failures never escape
//! as errors; they come back as a [`ToolOutput`] with `is_error` set.

use std::path::PathBuf;
use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;
use crate::context::{self, ContextError};
use crate::debug;
use crate::env::Env;
use crate::models::Documents;
use crate::orchestrator::{GenerationPipeline, PipelineError};
use crate::output::markdown::MarkdownRenderer;
use crate::output::{self, OutputError, OutputRenderer};
use crate::prompts::PromptLibrary;
use crate::providers::GenerationProvider;

/// Tool name as exposed to callers.
pub const TOOL_NAME: &str = "generateDocumentation";

/// Language used when the caller does not pick one.
pub const DEFAULT_LANGUAGE: &str = "English";

/// Tool input.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateDocumentationArgs {
    /// The absolute path to the local repository to analyze.
    pub project_path: PathBuf,
    /// Whether to include test files in analysis (default: false).
    #[serde(default)]
    pub include_tests: bool,
    /// The target language for the generated documentation (e.g. 'English', 'Polish').
    #[serde(default = "default_language")]
    pub target_language: Option<String>,
    /// Directory to write generated documentation to (relative to projectPath, or absolute).
    /// Files are written only when set.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

fn default_language() -> Option<String> {
    Some(DEFAULT_LANGUAGE.to_string())
}

impl GenerateDocumentationArgs {
    pub fn new(project_path: impl Into<PathBuf>) -> Self {
        Self {
            project_path: project_path.into(),
            include_tests: false,
            target_language: default_language(),
            output_dir: None,
        }
    }
}

/// Tool result.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub text: String,
    pub is_error: bool,
    /// Generated documents, when the run got that far.
    pub documents: Option<Documents>,
    /// Where documents were written, if anywhere.
    pub written_to: Option<PathBuf>,
}

impl ToolOutput {
    fn error(message: impl std::fmt::Display) -> Self {
        Self {
            text: format!("Error analyzing repository: {message}"),
            is_error: true,
            ..Self::default()
        }
    }
}

/// Errors that end a tool call.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error(transparent)]
    Context(#[from] ContextError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Runs documentation generation for one repository per call.
pub struct GenerateDocumentationTool {
    config: Config,
    env: Env,
    provider: Arc<dyn GenerationProvider>,
}

impl GenerateDocumentationTool {
    pub fn new(config: Config, env: Env, provider: Arc<dyn GenerationProvider>) -> Self {
        Self { config, env, provider }
    }

    /// Handle one invocation. Never fails; errors are reported in-band.
    pub async fn call(&self, args: GenerateDocumentationArgs) -> ToolOutput {
        match self.execute(&args).await {
            Ok(output) => output,
            Err(err) => {
                tracing::error!(path = %args.project_path.display(), "documentation generation failed: {err}");
                ToolOutput::error(err)
            }
        }
    }

    async fn execute(&self, args: &GenerateDocumentationArgs) -> Result<ToolOutput, ToolError> {
        let mut analysis = self.config.analysis.clone();
        analysis.include_tests |= args.include_tests;

        let sink = debug::sink_for(self.config.debug.enabled, &self.config.debug.dir);
        let repository =
            context::build_repository_context(&args.project_path, &analysis, &self.env, sink.as_ref()).await?;

        let prompts = match &self.config.prompts.dir {
            Some(dir) => PromptLibrary::with_override_dir(dir),
            None => PromptLibrary::builtin(),
        };
        let pipeline = GenerationPipeline::new(
            Arc::clone(&self.provider),
            prompts,
            sink,
            self.config.cache.ttl_seconds,
        );
        let language = args.target_language.as_deref().filter(|l| !l.trim().is_empty());
        let documents = pipeline.run(&repository, language).await?;

        match &args.output_dir {
            Some(dir) => {
                let target = output::resolve_output_dir(&args.project_path, dir);
                output::write_documents(&target, &documents).await?;
                Ok(ToolOutput {
                    text: format!(
                        "DOCUMENTATION GENERATED.\n\nFiles have been successfully written to: {}",
                        target.display()
                    ),
                    is_error: false,
                    documents: Some(documents),
                    written_to: Some(target),
                })
            }
            None => Ok(ToolOutput {
                text: MarkdownRenderer.render(&documents),
                is_error: false,
                documents: Some(documents),
                written_to: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::testing::MockProvider;

    fn tool(provider: MockProvider) -> GenerateDocumentationTool {
        GenerateDocumentationTool::new(
            Config::default(),
            Env::mock(Vec::<(&str, &str)>::new()),
            Arc::new(provider),
        )
    }

    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("main.rs"), "fn main() {}\n").unwrap();
        dir
    }

    #[test]
    fn args_deserialize_with_defaults() {
        let args: GenerateDocumentationArgs = serde_json::from_str(r#"{"projectPath": "/repo"}"#).unwrap();
        assert_eq!(args.project_path, PathBuf::from("/repo"));
        assert!(!args.include_tests);
        assert_eq!(args.target_language.as_deref(), Some("English"));
        assert!(args.output_dir.is_none());
    }

    #[test]
    fn schema_exposes_camel_case_fields() {
        let schema = serde_json::to_value(schemars::schema_for!(GenerateDocumentationArgs)).unwrap();
        let properties = schema["properties"].as_object().unwrap();
        for field in ["projectPath", "includeTests", "targetLanguage", "outputDir"] {
            assert!(properties.contains_key(field), "{field}");
        }
        assert_eq!(schema["required"], serde_json::json!(["projectPath"]));
    }

    #[tokio::test]
    async fn inline_result_lists_every_document() {
        let dir = project();
        let output = tool(MockProvider::new()).call(GenerateDocumentationArgs::new(dir.path())).await;

        assert!(!output.is_error, "{}", output.text);
        assert!(output.text.starts_with("RECOMMENDATION:"));
        assert!(output.text.contains("## README\n\n"));
        assert!(output.text.contains("## Evaluation\n\n"));
        assert!(output.written_to.is_none());
    }

    #[tokio::test]
    async fn output_dir_writes_files() {
        let dir = project();
        let mut args = GenerateDocumentationArgs::new(dir.path());
        args.output_dir = Some(PathBuf::from("docs"));

        let output = tool(MockProvider::new()).call(args).await;

        let target = dir.path().join("docs");
        assert_eq!(
            output.text,
            format!("DOCUMENTATION GENERATED.\n\nFiles have been successfully written to: {}", target.display())
        );
        for name in ["readme.md", "ai-context.md", "ddd-refactoring.md", "evaluation.md"] {
            assert!(target.join(name).exists(), "{name}");
        }
    }

    #[tokio::test]
    async fn missing_project_is_reported_in_band() {
        let dir = tempfile::tempdir().unwrap();
        let output = tool(MockProvider::new())
            .call(GenerateDocumentationArgs::new(dir.path().join("missing")))
            .await;

        assert!(output.is_error);
        assert!(output.text.starts_with("Error analyzing repository: "));
        assert!(output.documents.is_none());
    }

    #[tokio::test]
    async fn cache_failure_is_reported_in_band() {
        let dir = project();
        let output = tool(MockProvider::new().failing_cache())
            .call(GenerateDocumentationArgs::new(dir.path()))
            .await;

        assert!(output.is_error);
        assert!(output.text.contains("failed to create context cache"));
    }
}
