//! Command-line interface for pillarpost.
//!
//! Provides commands for running the content pipeline, validating drafts,
//! listing platforms, and inspecting the resolved configuration.

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::{self, ResolvedConfig};
use crate::core::{Orchestrator, PublisherRegistry, ValidationOutcome};
use crate::domain::{word_limit, PipelineConfig, Platform, RunReport};

/// pillarpost - Generate, validate and publish content pillars
#[derive(Parser, Debug)]
#[command(name = "pillarpost")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate content for a pillar and publish it to each platform
    Run {
        /// Content pillar (e.g. "ios_swift", "career_mentorship")
        #[arg(short, long)]
        pillar: String,

        /// Target platforms (comma-separated; unsupported ids are ignored)
        #[arg(long, value_delimiter = ',', default_value = "linkedin,medium,x")]
        platforms: Vec<String>,

        /// Generate and validate only; never publish
        #[arg(long)]
        dry_run: bool,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a draft against a platform's rules
    Validate {
        /// Platform whose limits apply
        #[arg(short, long)]
        platform: Platform,

        /// Input file (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// List supported platforms and their limits
    Platforms,

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Run {
                pillar,
                platforms,
                dry_run,
                json,
            } => run_content(PipelineConfig::new(platforms, pillar, dry_run), json).await,
            Commands::Validate { platform, input } => validate_draft(platform, input),
            Commands::Platforms => list_platforms(),
            Commands::Config => show_config(),
        }
    }
}

/// Run the pipeline, cancelling on Ctrl-C
async fn run_content(request: PipelineConfig, json: bool) -> Result<()> {
    let config = config::config()?;
    let orchestrator = Orchestrator::from_config(config)?;

    let shutdown = async {
        // If the handler can't be installed, run without cancellation
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    let report = orchestrator.run_until(&request, shutdown).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize run report")?
        );
    } else {
        print_report(&report);
    }

    if !report.is_success() {
        std::process::exit(1);
    }

    Ok(())
}

fn print_report(report: &RunReport) {
    println!("Run ID: {}", report.run_id);
    println!("Pillar: {}", report.pillar);
    if report.dry_run {
        println!("Mode: dry run");
    }
    println!();

    for result in report.results.values() {
        println!(
            "  {:<10} {:<18} {}",
            result.platform,
            result.outcome.label(),
            result.outcome.detail()
        );
    }

    if report.cancelled {
        eprintln!("\n[Run {} cancelled before all platforms finished]", report.run_id);
    }

    let failed = report.failed();
    if !failed.is_empty() {
        let ids: Vec<&str> = failed.iter().map(Platform::as_str).collect();
        eprintln!("\n[Re-run with --platforms {}]", ids.join(","));
    }
}

/// Validate a draft from a file or stdin
fn validate_draft(platform: Platform, input_file: Option<PathBuf>) -> Result<()> {
    let content = if let Some(path) = input_file {
        std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read input file: {}", path.display()))?
    } else if !io::stdin().is_terminal() {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        buffer
    } else {
        anyhow::bail!("No input provided. Use --input <file> or pipe to stdin");
    };

    let outcome = validate_content(config::config(), &content, platform)?;

    if outcome.passed {
        println!("✓ Content passes {} validation", platform);
        return Ok(());
    }

    println!("✗ Content failed {} validation:", platform);
    for failure in &outcome.failures {
        println!("  - {}", failure);
    }
    std::process::exit(1);
}

/// Apply the configured validator; a broken config file is an error, not a silent default
fn validate_content(
    config: Result<&ResolvedConfig>,
    content: &str,
    platform: Platform,
) -> Result<ValidationOutcome> {
    let config = config.context("Cannot validate without a usable configuration")?;
    Ok(config.validation.validate(content, platform))
}

/// List supported platforms with limits and publisher availability
fn list_platforms() -> Result<()> {
    let config = config::config()?;
    let registry = PublisherRegistry::from_config(&config.publishers);

    println!(
        "{:<10} {:>10} {:>10}  {}",
        "PLATFORM", "WORDS", "MAX CHARS", "PUBLISHER"
    );
    for platform in Platform::ALL {
        let max_chars = config
            .validation
            .max_chars
            .get(&platform)
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".to_string());
        let publisher = if registry.contains(platform) {
            "configured"
        } else {
            "missing credentials"
        };
        println!(
            "{:<10} {:>10} {:>10}  {}",
            platform,
            word_limit(platform.as_str()),
            max_chars,
            publisher
        );
    }

    Ok(())
}

/// Show the resolved configuration with secrets redacted
fn show_config() -> Result<()> {
    let config: &ResolvedConfig = config::config()?;

    println!("pillarpost configuration");
    println!("========================\n");

    match &config.config_file {
        Some(path) => println!("Config file: {}", path.display()),
        None => println!("Config file: (none found, using defaults)"),
    }

    println!("\nGeneration:");
    println!("  model:         {}", config.generation.model);
    println!("  max_tokens:    {}", config.generation.max_tokens);
    println!("  timeout_secs:  {}", config.generation.timeout_secs);
    println!("  system_prompt: {}", config.generation.system_prompt.display());
    println!(
        "  api_key:       {}",
        if config.generation.api_key.is_some() { "set" } else { "missing" }
    );

    println!("\nValidation:");
    println!("  min_chars: {}", config.validation.min_chars);
    for (platform, limit) in &config.validation.max_chars {
        println!("  max_chars[{}]: {}", platform, limit);
    }

    println!("\nPublishers:");
    let status = |present: bool| if present { "configured" } else { "missing credentials" };
    println!("  x:        {}", status(config.publishers.x.is_some()));
    println!("  medium:   {}", status(config.publishers.medium.is_some()));
    if let Some(ref medium) = config.publishers.medium {
        println!("            publish_status = {}", medium.publish_status);
    }
    println!("  linkedin: {}", status(config.publishers.linkedin.is_some()));

    Ok(())
}
