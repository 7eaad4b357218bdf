//! Structured logging for pipeline runs
//!
//! Every event carries an `event` field and the run identifier so JSON log
//! lines from one invocation can be grouped.

use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::error::FinderError;

/// Structured logger for one pipeline run
#[derive(Clone)]
pub struct RunLogger {
    run_id: String,
    started_at: DateTime<Utc>,
}

impl Default for RunLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl RunLogger {
    pub fn new() -> Self {
        let started_at = Utc::now();
        Self {
            run_id: started_at.format("%Y%m%dT%H%M%S%.3fZ").to_string(),
            started_at,
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    fn elapsed_ms(&self) -> i64 {
        (Utc::now() - self.started_at).num_milliseconds()
    }

    /// Log run start with the effective thresholds
    pub fn log_run_started(
        &self,
        redis_min_version: &str,
        memcached_min_version: &str,
        size_family: &str,
        dry_run: bool,
    ) {
        info!(
            event = "run_started",
            run_id = %self.run_id,
            redis_min_version = %redis_min_version,
            memcached_min_version = %memcached_min_version,
            size_family = %size_family,
            dry_run = dry_run,
            "Graviton finder run started"
        );
    }

    pub fn log_classified(&self, scanned: usize, included: usize, candidates: usize) {
        info!(
            event = "clusters_classified",
            run_id = %self.run_id,
            scanned = scanned,
            included = included,
            candidates = candidates,
            "Cluster inventory classified"
        );
    }

    pub fn log_reconciled(&self, scanned: usize, matched: usize, under_reserved: usize) {
        info!(
            event = "reservations_reconciled",
            run_id = %self.run_id,
            scanned = scanned,
            matched = matched,
            under_reserved = under_reserved,
            "Reservations reconciled"
        );
    }

    pub fn log_upload(&self, bucket: &str, key: &str, bytes: usize) {
        info!(
            event = "artifact_uploaded",
            run_id = %self.run_id,
            bucket = %bucket,
            key = %key,
            bytes = bytes,
            "Report uploaded"
        );
    }

    pub fn log_run_completed(&self, candidates: usize, node_types: usize) {
        info!(
            event = "run_completed",
            run_id = %self.run_id,
            candidates = candidates,
            node_types = node_types,
            elapsed_ms = self.elapsed_ms(),
            "Graviton finder run completed"
        );
    }

    pub fn log_run_failed(&self, err: &FinderError) {
        error!(
            event = "run_failed",
            run_id = %self.run_id,
            stage = err.stage(),
            error = %err,
            elapsed_ms = self.elapsed_ms(),
            "Exception in executing analysis"
        );
    }
}
