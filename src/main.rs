//! repo-onboarder: onboarding documentation generator CLI.
//!
//! Entry point and error handling boundary. Uses `anyhow` for
//! ergonomic error propagation and user-facing messages.

mod cli;

use repo_onboarder::config;
use repo_onboarder::constants;
use repo_onboarder::context;
use repo_onboarder::debug;
use repo_onboarder::env;
use repo_onboarder::mcp;
use repo_onboarder::models;
use repo_onboarder::output;
use repo_onboarder::providers;
use repo_onboarder::tool;

use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use cli::args::{Cli, Command, ContextArgs, GenerateArgs, ServeArgs};
use config::Config;
use env::Env;
use output::OutputRenderer;
use providers::GenerationProvider;
use providers::gemini::GeminiProvider;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    cli::init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Generate(args) => run_generate(*args).await,
        Command::Context(args) => run_context(args).await,
        Command::Serve(args) => run_serve(args).await,
        Command::Strategies => run_strategies(),
        Command::Version => run_version(),
    }
}

/// Print detailed version and build information.
fn run_version() -> Result<()> {
    use colored::Colorize;

    println!(
        "{} {}",
        constants::APP_NAME.bold(),
        constants::VERSION.green().bold()
    );
    println!("{}     {}", "target:".dimmed(), constants::TARGET);
    println!("{}      {}", "model:".dimmed(), constants::DEFAULT_MODEL);
    Ok(())
}

/// List document labels with their prompt and document templates.
fn run_strategies() -> Result<()> {
    use colored::Colorize;

    for spec in models::DOCUMENTS.iter().chain(std::iter::once(&models::EVALUATION)) {
        println!(
            "  {}  {}",
            spec.label.bold(),
            output::document_filename(spec.label).dimmed(),
        );
        println!("         {}  {}", "prompt:".cyan(), spec.prompt_template);
        println!("         {}  {}", "template:".cyan(), spec.doc_template);
    }
    Ok(())
}

/// Load layered configuration for the project at `path`.
fn load_config(path: &std::path::Path, env: &Env) -> Result<Config> {
    Config::load(Some(path), env).context("failed to load configuration")
}

/// Assemble and print the context payload.
async fn run_context(args: ContextArgs) -> Result<()> {
    let env = Env::real();
    let mut config = load_config(&args.collect.path, &env)?;
    args.collect.apply_to(&mut config);

    let sink = debug::sink_for(config.debug.enabled, &config.debug.dir);
    let repository = context::build_repository_context(&args.collect.path, &config.analysis, &env, sink.as_ref())
        .await
        .context("failed to collect repository context")?;
    let payload = context::assemble(&repository).context("failed to assemble context payload")?;

    match args.output {
        Some(path) => {
            tokio::fs::write(&path, &payload)
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!(
                "Wrote {} bytes ({} files, {} commits) to {}",
                payload.len(),
                repository.files.len(),
                repository.commits.len(),
                path.display()
            );
        }
        None => print!("{payload}"),
    }
    Ok(())
}

/// Serve the documentation tool over MCP on stdin/stdout.
///
/// Configuration is resolved once from the working directory and
/// validated before the session starts.
async fn run_serve(args: ServeArgs) -> Result<()> {
    let env = Env::real();
    let cwd = std::env::current_dir().context("failed to resolve working directory")?;
    let mut config = load_config(&cwd, &env)?;
    args.apply_to(&mut config);
    config.validate()?;
    tracing::debug!(?config, "resolved configuration");

    let provider: Arc<dyn GenerationProvider> =
        Arc::new(GeminiProvider::new(&config.provider).map_err(|e| anyhow::anyhow!("{e}"))?);
    let tool = tool::GenerateDocumentationTool::new(config, env, provider);

    tracing::info!(tool = tool::TOOL_NAME, "starting {} MCP server on stdio", constants::APP_NAME);
    mcp::serve_stdio(mcp::OnboarderServer::new(tool))
        .await
        .context("MCP server failed")
}

/// Run the documentation tool and print its result.
///
/// Configuration problems exit non-zero before any work starts. Once the
/// tool runs, its outcome is reported on stdout and the exit code stays 0.
async fn run_generate(args: GenerateArgs) -> Result<()> {
    let env = Env::real();
    let mut config = load_config(&args.collect.path, &env)?;
    args.apply_to(&mut config);
    config.validate()?;
    tracing::debug!(?config, "resolved configuration");

    let provider: Arc<dyn GenerationProvider> =
        Arc::new(GeminiProvider::new(&config.provider).map_err(|e| anyhow::anyhow!("{e}"))?);
    let tool = tool::GenerateDocumentationTool::new(config, env, provider);
    let result = tool.call(args.tool_args()).await;

    if let Some(documents) = &result.documents {
        eprint!("{}", output::terminal::TerminalRenderer.render(documents));
    }

    match (&result.documents, args.format) {
        (Some(documents), cli::args::OutputFormat::Json) if !result.is_error => {
            println!("{}", args.format.render(documents));
        }
        _ => println!("{}", result.text),
    }
    Ok(())
}
