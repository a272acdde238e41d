//! LLM News CLI
//!
//! `serve` runs the collector with its HTTP API; the other commands are
//! one-shot runs for debugging sources and configuration.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use llm_news::{
    error::Result,
    models::Config,
    pipeline::{PaperPipeline, Pipeline, PipelineJob, RepoPipeline},
    server::{self, AppState},
    services::search_model_repos,
    storage::Snapshots,
    utils::http,
};

/// LLM News - AI repository and research article aggregator
#[derive(Parser, Debug)]
#[command(
    name = "llm-news",
    version,
    about = "Collects trending AI repositories and research articles"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Collect once, then serve the API and refresh on a schedule
    Serve,

    /// Run one pipeline and print the result as JSON
    Collect {
        #[arg(value_enum)]
        kind: CollectKind,
    },

    /// Search GitHub for one model's repositories
    Search {
        /// Model name, e.g. "deepseek" or "claude"
        model: String,
    },

    /// Validate the configuration file
    Validate,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CollectKind {
    Repos,
    Papers,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn serve(config: &Config) -> Result<()> {
    let snapshots = Snapshots::new();
    let repos_job = Arc::new(PipelineJob::new(
        RepoPipeline::from_config(config)?,
        Arc::clone(&snapshots.repos),
    ));
    let papers_job = Arc::new(PipelineJob::new(
        PaperPipeline::from_config(config)?,
        Arc::clone(&snapshots.papers),
    ));

    // Eager first run so the API starts with data when the sources are up.
    let (repos, papers) = tokio::join!(repos_job.run_once(), papers_job.run_once());
    if let Err(e) = repos {
        log::error!("Initial repository collection failed: {}", e);
    }
    if let Err(e) = papers {
        log::error!("Initial paper collection failed: {}", e);
    }

    repos_job.spawn_periodic(Duration::from_secs(config.schedule.repos_interval_secs));
    papers_job.spawn_periodic(Duration::from_secs(config.schedule.papers_interval_secs));

    let state = AppState::from_config(config, snapshots)?;
    server::serve(config, state).await
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default(&cli.config).with_env_token();
    log::info!("Loaded configuration from {}", cli.config.display());

    match cli.command {
        Command::Serve => {
            config.validate()?;
            serve(&config).await?;
        }

        Command::Collect { kind } => match kind {
            CollectKind::Repos => print_json(&RepoPipeline::from_config(&config)?.run().await?)?,
            CollectKind::Papers => print_json(&PaperPipeline::from_config(&config)?.run().await?)?,
        },

        Command::Search { model } => {
            let client = http::create_github_client(&config.http)?;
            let repos = search_model_repos(&client, &config.sources.github_api_base, &model).await?;
            log::info!("Found {} repositories for {}", repos.len(), model);
            print_json(&repos)?;
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("Config OK");
        }
    }

    Ok(())
}
