//! ElastiCache Graviton Finder CLI
//!
//! A command-line tool for running the Graviton finder by hand: dry-run
//! scans, full runs, and configuration inspection.

mod commands;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::{config, run, scan};
use finder_lib::{FinderConfig, Pipeline, Services};
use tracing_subscriber::EnvFilter;

/// ElastiCache Graviton Finder CLI
#[derive(Parser)]
#[command(name = "gfinder")]
#[command(author, version, about = "CLI for the ElastiCache Graviton Finder", long_about = None)]
pub struct Cli {
    /// Inventory region (overrides the REGION env var)
    #[arg(long, env = "REGION")]
    pub region: Option<String>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify clusters and reconcile reservations without uploading or alerting
    Scan {
        /// Only list clusters that are Graviton candidates
        #[arg(long)]
        candidates_only: bool,
    },

    /// Run the full pipeline: upload both reports and send alerts
    Run,

    /// Show the configuration resolved from the environment
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = execute(cli).await {
        output::print_error(&format!("{:#}", err));
        std::process::exit(1);
    }
}

async fn execute(cli: Cli) -> Result<()> {
    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();

    let mut finder_config = FinderConfig::load().context("Failed to load configuration")?;
    if cli.region.is_some() {
        finder_config.region = cli.region;
    }

    match cli.command {
        Commands::Scan { candidates_only } => {
            let pipeline = build_pipeline(finder_config).await;
            scan::scan(&pipeline, candidates_only, cli.format).await?;
        }
        Commands::Run => {
            let pipeline = build_pipeline(finder_config).await;
            run::run(&pipeline, cli.format).await?;
        }
        Commands::Config => {
            config::show_config(&finder_config, cli.format)?;
        }
    }

    Ok(())
}

async fn build_pipeline(config: FinderConfig) -> Pipeline {
    let services = Services::from_aws(config.region.as_deref()).await;
    Pipeline::new(config, services)
}
