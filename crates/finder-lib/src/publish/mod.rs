//! Report publishing and end-to-end orchestration
//!
//! A run classifies the cluster inventory, reconciles reservations,
//! renders both reports, writes them to the report directory and uploads
//! them. Any failure is logged, reported once on the error topic and
//! returned to the caller.

mod s3;

#[cfg(test)]
mod tests;

pub use s3::S3Store;

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::analysis::{ClusterClassifier, ReservationReconciler};
use crate::config::FinderConfig;
use crate::error::FinderError;
use crate::inventory::{ClusterInventory, ElastiCacheInventory, NodeTypeFilter, ReservationInventory};
use crate::models::RunResult;
use crate::notify::{NotificationChannel, Notifier, RunAlerts, SnsChannel};
use crate::observability::RunLogger;
use crate::report::{render_candidates, render_summary};

pub use async_trait::async_trait;

/// Durable storage for rendered reports
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(&self, local_path: &Path, bucket: &str, key: &str) -> Result<(), FinderError>;
}

/// External collaborators of a run, built once per process
#[derive(Clone)]
pub struct Services {
    pub clusters: Arc<dyn ClusterInventory>,
    pub reservations: Arc<dyn ReservationInventory>,
    pub store: Arc<dyn ObjectStore>,
    pub channel: Arc<dyn NotificationChannel>,
}

impl Services {
    /// Build AWS clients from the default credential and region chain.
    ///
    /// `region` only applies to the ElastiCache inventory.
    pub async fn from_aws(region: Option<&str>) -> Self {
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .load()
            .await;
        let inventory = Arc::new(ElastiCacheInventory::from_conf(&sdk_config, region));

        Self {
            clusters: inventory.clone(),
            reservations: inventory,
            store: Arc::new(S3Store::from_conf(&sdk_config)),
            channel: Arc::new(SnsChannel::from_conf(&sdk_config)),
        }
    }
}

/// Both report tables plus inventory totals
#[derive(Debug, Clone, Default, Serialize)]
pub struct Analysis {
    pub result: RunResult,
    pub clusters_scanned: usize,
    pub reservations_scanned: usize,
}

/// Summary of a successful run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub generated_at: DateTime<Utc>,
    pub clusters_scanned: usize,
    pub clusters_included: usize,
    pub candidates: usize,
    pub node_types: usize,
    pub under_reserved: Vec<String>,
    pub graviton_alert_sent: bool,
    pub reservation_alert_sent: bool,
    pub uploaded: Vec<String>,
}

/// Response returned to the scheduler on success
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResponse {
    pub status_code: u16,
    pub body: String,
}

impl InvocationResponse {
    pub fn success() -> Self {
        Self {
            status_code: 200,
            body: "\"Success!\"".to_string(),
        }
    }
}

/// Drives one finder run against injected services
pub struct Pipeline {
    config: FinderConfig,
    services: Services,
    notifier: Notifier,
    classifier: ClusterClassifier,
    reconciler: ReservationReconciler,
}

impl Pipeline {
    pub fn new(config: FinderConfig, services: Services) -> Self {
        let filter = NodeTypeFilter::new(&config.size_family, &config.graviton_marker);
        let notifier = Notifier::new(
            services.channel.clone(),
            &config.alert_topic,
            &config.findings_topic,
        );

        Self {
            classifier: ClusterClassifier::new(
                filter.clone(),
                &config.redis_min_version,
                &config.memcached_min_version,
            ),
            reconciler: ReservationReconciler::new(filter),
            notifier,
            services,
            config,
        }
    }

    /// Replace the notifier, e.g. to change the retry policy
    pub fn with_notifier(mut self, notifier: Notifier) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Classify clusters and reconcile reservations
    pub async fn analyze(
        &self,
        alerts: &mut RunAlerts<'_>,
        logger: &RunLogger,
    ) -> Result<Analysis, FinderError> {
        let classification = self
            .classifier
            .classify(self.services.clusters.as_ref(), alerts)
            .await?;
        logger.log_classified(
            classification.scanned,
            classification.rows.len(),
            classification.candidates().count(),
        );

        let mut counts = classification.counts;
        let reconciliation = self
            .reconciler
            .reconcile(self.services.reservations.as_ref(), &mut counts, alerts)
            .await?;
        logger.log_reconciled(
            reconciliation.scanned,
            reconciliation.matched,
            reconciliation.under_reserved().count(),
        );

        Ok(Analysis {
            result: RunResult {
                candidate_rows: classification.rows,
                summary_rows: reconciliation.rows,
            },
            clusters_scanned: classification.scanned,
            reservations_scanned: reconciliation.scanned,
        })
    }

    /// Analyse without sending alerts or uploading reports
    pub async fn scan(&self) -> Result<Analysis, FinderError> {
        let logger = RunLogger::new();
        logger.log_run_started(
            &self.config.redis_min_version,
            &self.config.memcached_min_version,
            &self.config.size_family,
            true,
        );
        self.analyze(&mut RunAlerts::silent(), &logger).await
    }

    /// Run the full pipeline; a failure sends one error alert
    pub async fn run(&self) -> Result<RunReport, FinderError> {
        let logger = RunLogger::new();
        logger.log_run_started(
            &self.config.redis_min_version,
            &self.config.memcached_min_version,
            &self.config.size_family,
            false,
        );

        match self.execute(&logger).await {
            Ok(report) => {
                logger.log_run_completed(report.candidates, report.node_types);
                Ok(report)
            }
            Err(err) => {
                logger.log_run_failed(&err);
                self.notifier.alert_error(&err.to_string()).await;
                Err(err)
            }
        }
    }

    async fn execute(&self, logger: &RunLogger) -> Result<RunReport, FinderError> {
        let mut alerts = RunAlerts::new(&self.notifier, self.config.report_location());
        let analysis = self.analyze(&mut alerts, logger).await?;
        let result = &analysis.result;

        let artifacts = [
            render_candidates(&result.candidate_rows)?,
            render_summary(&result.summary_rows)?,
        ];

        let mut written = Vec::with_capacity(artifacts.len());
        for artifact in &artifacts {
            written.push(artifact.write_to(&self.config.report_dir).await?);
        }

        let mut uploaded = Vec::with_capacity(artifacts.len());
        for (artifact, path) in artifacts.iter().zip(&written) {
            let key = self.config.object_key(artifact.file_name);
            self.services
                .store
                .upload(path, &self.config.bucket_name, &key)
                .await?;
            logger.log_upload(&self.config.bucket_name, &key, artifact.body.len());
            uploaded.push(key);
        }

        Ok(RunReport {
            run_id: logger.run_id().to_string(),
            generated_at: logger.started_at(),
            clusters_scanned: analysis.clusters_scanned,
            clusters_included: result.candidate_rows.len(),
            candidates: result.candidate_count(),
            node_types: result.summary_rows.len(),
            under_reserved: result
                .under_reserved()
                .map(|r| r.node_type.clone())
                .collect(),
            graviton_alert_sent: alerts.graviton_sent(),
            reservation_alert_sent: alerts.reservation_sent(),
            uploaded,
        })
    }

    /// Send an error alert for a failure raised outside `run`
    pub async fn report_failure(&self, message: &str) {
        self.notifier.alert_error(message).await;
    }

    /// Scheduler entry point; the event payload is not inspected
    pub async fn handle(
        &self,
        event: &serde_json::Value,
    ) -> Result<InvocationResponse, FinderError> {
        debug!(payload = %event, "Invocation received");
        self.run().await?;
        Ok(InvocationResponse::success())
    }
}
