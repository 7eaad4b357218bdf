//! Graviton Finder - ElastiCache Graviton candidate and reservation report
//!
//! This binary is started by a scheduled trigger. Each start performs one
//! invocation: it classifies the ElastiCache inventory, uploads both
//! reports to S3 and prints the invocation response.

use anyhow::{Context, Result};
use finder_lib::{FinderConfig, Pipeline, Services};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod invoke;

const FINDER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!(version = FINDER_VERSION, "Starting graviton-finder");

    // Load configuration; missing options fail before any client is built
    let config = FinderConfig::load().context("Failed to load configuration")?;
    info!(
        bucket = %config.bucket_name,
        path = %config.bucket_path,
        region = ?config.region,
        "Finder configured"
    );

    let event = invoke::read_event(std::env::args().nth(1).as_deref())?;
    let deadline = config.run_timeout();

    let services = Services::from_aws(config.region.as_deref()).await;
    let pipeline = Pipeline::new(config, services);

    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };
    let response = invoke::invoke(&pipeline, &event, deadline, shutdown).await?;

    println!("{}", serde_json::to_string(&response)?);
    Ok(())
}
