//! Prompt templates and prompt construction.
//!
//! Templates are embedded via `include_str!` so they ship with the binary.
//! A configured prompts directory is searched first, file by file.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::debug::DebugSink;
use crate::models::Strategy;
use crate::providers::CacheHandle;

/// Replaced by a notice when the context is served from a cache.
pub const CONTEXT_PLACEHOLDER: &str = "$REPOSITORY_CONTEXT_PAYLOAD_PLACEHOLDER$";
pub const DOCUMENTATION_TEMPLATE_PLACEHOLDER: &str = "$DOCUMENTATION_TEMPLATE$";
pub const LANGUAGE_PLACEHOLDER: &str = "$LANGUAGE_INSTRUCTION$";
pub const GENERATED_DOCS_PLACEHOLDER: &str = "$GENERATED_DOCUMENTATION_PLACEHOLDER$";

/// Text substituted for [`CONTEXT_PLACEHOLDER`] when a cache handle exists.
pub const CACHED_CONTEXT_NOTICE: &str = "(Context provided via Context Caching)";

const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    ("readme-prompt-template.md", include_str!("templates/readme-prompt-template.md")),
    ("readme-documentation-template.md", include_str!("templates/readme-documentation-template.md")),
    ("ai-context-prompt-template.md", include_str!("templates/ai-context-prompt-template.md")),
    ("ai-context-documentation-template.md", include_str!("templates/ai-context-documentation-template.md")),
    ("ddd-refactoring-prompt-template.md", include_str!("templates/ddd-refactoring-prompt-template.md")),
    ("ddd-refactoring-template.md", include_str!("templates/ddd-refactoring-template.md")),
    ("dictionary-prompt-template.md", include_str!("templates/dictionary-prompt-template.md")),
    ("dictionary-documentation-template.md", include_str!("templates/dictionary-documentation-template.md")),
    ("quality-assessment-prompt-template.md", include_str!("templates/quality-assessment-prompt-template.md")),
    (
        "quality-assessment-documentation-template.md",
        include_str!("templates/quality-assessment-documentation-template.md"),
    ),
    ("refactoring-prompt-template.md", include_str!("templates/refactoring-prompt-template.md")),
    ("refactoring-documentation-template.md", include_str!("templates/refactoring-documentation-template.md")),
    ("judge-validation-template.md", include_str!("templates/judge-validation-template.md")),
    ("judge-documentation-template.md", include_str!("templates/judge-documentation-template.md")),
];

/// Errors from template loading.
#[derive(Error, Debug)]
pub enum PromptError {
    #[error("template not found: {0}")]
    NotFound(String),

    #[error("failed to read template {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Get a built-in template by file name.
pub fn get_builtin(name: &str) -> Option<&'static str> {
    BUILTIN_TEMPLATES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, body)| *body)
}

/// List all built-in template names.
pub fn list_builtin_names() -> Vec<&'static str> {
    BUILTIN_TEMPLATES.iter().map(|(n, _)| *n).collect()
}

/// Resolves template names to template text.
#[derive(Debug, Clone, Default)]
pub struct PromptLibrary {
    override_dir: Option<PathBuf>,
}

impl PromptLibrary {
    /// Only the embedded templates.
    pub fn builtin() -> Self {
        Self { override_dir: None }
    }

    /// Search `dir` before the embedded templates.
    pub fn with_override_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            override_dir: Some(dir.into()),
        }
    }

    pub fn override_dir(&self) -> Option<&Path> {
        self.override_dir.as_deref()
    }

    /// Load a template by file name.
    pub async fn load(&self, name: &str) -> Result<String, PromptError> {
        if let Some(dir) = &self.override_dir {
            let path = dir.join(name);
            match tokio::fs::read_to_string(&path).await {
                Ok(body) => return Ok(body),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(source) => return Err(PromptError::Read { path, source }),
            }
        }

        get_builtin(name)
            .map(str::to_string)
            .ok_or_else(|| PromptError::NotFound(name.to_string()))
    }

    /// Load both templates of `strategy` and fill in every placeholder.
    ///
    /// The prepared prompt is recorded to `sink` as
    /// `prepared_prompt_{template stem}`.
    pub async fn build_prompt(
        &self,
        strategy: &Strategy,
        target_language: Option<&str>,
        cache: Option<&CacheHandle>,
        sink: &dyn DebugSink,
    ) -> Result<String, PromptError> {
        let spec = strategy.spec();
        let prompt_template = self.load(spec.prompt_template).await?;
        let doc_template = self.load(spec.doc_template).await?;

        let prompt = render(
            &prompt_template,
            &doc_template,
            target_language,
            cache.is_some(),
            strategy.generated_docs(),
        );

        let stem = Path::new(spec.prompt_template)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| spec.prompt_template.to_string());
        sink.record(&format!("prepared_prompt_{stem}"), "md", &prompt);

        Ok(prompt)
    }
}

/// Substitute the first occurrence of each placeholder.
///
/// Without a cache the context placeholder is left in place; inlining the
/// payload into the prompt is not supported.
pub fn render(
    prompt_template: &str,
    doc_template: &str,
    target_language: Option<&str>,
    cached: bool,
    generated_docs: Option<&str>,
) -> String {
    let mut prompt = prompt_template.to_string();

    if cached {
        prompt = prompt.replacen(CONTEXT_PLACEHOLDER, CACHED_CONTEXT_NOTICE, 1);
    } else {
        tracing::error!("no context cache available; repository context is not included in the prompt");
    }

    prompt = prompt.replacen(DOCUMENTATION_TEMPLATE_PLACEHOLDER, doc_template, 1);
    prompt = prompt.replacen(LANGUAGE_PLACEHOLDER, &language_instruction(target_language), 1);
    prompt.replacen(GENERATED_DOCS_PLACEHOLDER, generated_docs.unwrap_or(""), 1)
}

/// The instruction line for `target_language`, or empty when none is set.
pub fn language_instruction(target_language: Option<&str>) -> String {
    match target_language.map(str::trim) {
        Some(lang) if !lang.is_empty() => format!("- IMPORTANT: Response MUST be in {lang} language"),
        _ => String::new(),
    }
}
