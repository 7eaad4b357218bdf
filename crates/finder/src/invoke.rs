//! Single invocation with an external deadline
//!
//! The run future is dropped when the deadline passes or a shutdown signal
//! arrives, which cancels any in-flight inventory or upload request.

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use finder_lib::{InvocationResponse, Pipeline};
use tracing::warn;

/// Parse the optional event argument; no argument is an empty event
pub fn read_event(arg: Option<&str>) -> Result<serde_json::Value> {
    match arg {
        Some(raw) => serde_json::from_str(raw).context("Invocation event is not valid JSON"),
        None => Ok(serde_json::json!({})),
    }
}

/// Run one invocation, bounded by `deadline` and `shutdown`
pub async fn invoke<F>(
    pipeline: &Pipeline,
    event: &serde_json::Value,
    deadline: Duration,
    shutdown: F,
) -> Result<InvocationResponse>
where
    F: Future<Output = ()>,
{
    let message = tokio::select! {
        outcome = tokio::time::timeout(deadline, pipeline.handle(event)) => match outcome {
            Ok(result) => return result.context("Graviton finder run failed"),
            Err(_) => format!("Run exceeded deadline of {}s", deadline.as_secs()),
        },
        _ = shutdown => "Run interrupted by shutdown signal".to_string(),
    };

    warn!(event = "run_cancelled", reason = %message, "Run cancelled");
    pipeline.report_failure(&message).await;
    anyhow::bail!(message)
}
