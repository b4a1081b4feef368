//! Clap argument types and config overrides.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use repo_onboarder::config::Config;
use repo_onboarder::models::Documents;
use repo_onboarder::tool::{DEFAULT_LANGUAGE, GenerateDocumentationArgs};

/// Generate onboarding documentation for a local repository.
#[derive(Parser, Debug)]
#[command(
    name = "repo-onboarder",
    version = repo_onboarder::constants::VERSION,
    about = super::ABOUT,
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Analyze a repository and generate its documentation set.
    Generate(Box<GenerateArgs>),

    /// Print the repository context payload without contacting the model.
    Context(ContextArgs),

    /// Run an MCP server on stdio exposing the generateDocumentation tool.
    Serve(ServeArgs),

    /// List the generated documents and the templates behind them.
    Strategies,

    /// Print version and build information.
    Version,
}

/// Options shared by every command that collects a repository.
#[derive(clap::Args, Debug, Clone)]
pub struct CollectArgs {
    /// Path to the repository (default: current directory).
    #[arg(long, default_value = ".")]
    pub path: PathBuf,

    /// Include files whose path contains "test".
    #[arg(long, default_value_t = false)]
    pub include_tests: bool,

    /// Number of recent non-merge commits to inspect.
    #[arg(long)]
    pub commit_limit: Option<usize>,

    /// Branch name to report instead of the detected one.
    #[arg(long)]
    pub branch: Option<String>,
}

impl CollectArgs {
    /// Layer the CLI flags over the loaded configuration.
    pub fn apply_to(&self, config: &mut Config) {
        if self.include_tests {
            config.analysis.include_tests = true;
        }
        if let Some(limit) = self.commit_limit {
            config.analysis.commit_limit = limit;
        }
        if let Some(ref branch) = self.branch {
            config.analysis.branch = Some(branch.clone());
        }
    }
}

/// Arguments for the `generate` subcommand.
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub collect: CollectArgs,

    /// Language the documents are written in.
    #[arg(long, default_value = DEFAULT_LANGUAGE)]
    pub language: String,

    /// Write one Markdown file per document here (relative to --path, or absolute).
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    #[command(flatten)]
    pub generation: GenerationArgs,

    /// Output format for the generated documents on stdout.
    #[arg(long, value_enum, default_value_t = OutputFormat::Markdown)]
    pub format: OutputFormat,
}

/// Model and prompt options shared by `generate` and `serve`.
#[derive(clap::Args, Debug, Clone)]
pub struct GenerationArgs {
    /// Directory with prompt templates that override the built-in ones.
    #[arg(long)]
    pub prompts_dir: Option<PathBuf>,

    /// Model to use (overrides config and environment).
    #[arg(long)]
    pub model: Option<String>,

    /// Remote cache lifetime in seconds.
    #[arg(long)]
    pub cache_ttl: Option<u64>,

    /// Write intermediate artefacts (payload, prompts) to the debug directory.
    #[arg(long, default_value_t = false)]
    pub debug: bool,
}

impl GenerationArgs {
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(ref dir) = self.prompts_dir {
            config.prompts.dir = Some(dir.clone());
        }
        if let Some(ref model) = self.model {
            config.provider.model = model.clone();
        }
        if let Some(ttl) = self.cache_ttl {
            config.cache.ttl_seconds = ttl;
        }
        if self.debug {
            config.debug.enabled = true;
        }
    }
}

impl GenerateArgs {
    /// Layer the CLI flags over the loaded configuration.
    pub fn apply_to(&self, config: &mut Config) {
        self.collect.apply_to(config);
        self.generation.apply_to(config);
    }

    /// The tool invocation these flags describe.
    pub fn tool_args(&self) -> GenerateDocumentationArgs {
        GenerateDocumentationArgs {
            project_path: self.collect.path.clone(),
            include_tests: self.collect.include_tests,
            target_language: Some(self.language.clone()),
            output_dir: self.output_dir.clone(),
        }
    }
}

/// Arguments for the `context` subcommand.
#[derive(Parser, Debug)]
pub struct ContextArgs {
    #[command(flatten)]
    pub collect: CollectArgs,

    /// Write the payload to this file instead of stdout.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Arguments for the `serve` subcommand.
///
/// Per-call options (path, tests, language, output dir) arrive as tool
/// arguments; configuration is loaded from the working directory.
#[derive(Parser, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub generation: GenerationArgs,

    /// Number of recent non-merge commits to inspect.
    #[arg(long)]
    pub commit_limit: Option<usize>,
}

impl ServeArgs {
    /// Layer the CLI flags over the loaded configuration.
    pub fn apply_to(&self, config: &mut Config) {
        self.generation.apply_to(config);
        if let Some(limit) = self.commit_limit {
            config.analysis.commit_limit = limit;
        }
    }
}

/// Supported stdout formats for `generate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// The tool's text result.
    Markdown,
    /// Documents and summary as JSON.
    Json,
}

impl OutputFormat {
    /// Render documents using the renderer for this format.
    pub fn render(&self, documents: &Documents) -> String {
        use repo_onboarder::output::OutputRenderer;
        match self {
            OutputFormat::Markdown => repo_onboarder::output::markdown::MarkdownRenderer.render(documents),
            OutputFormat::Json => repo_onboarder::output::json::JsonRenderer.render(documents),
        }
    }
}
