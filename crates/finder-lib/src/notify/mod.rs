//! Alert emission for pipeline findings and failures
//!
//! Handles:
//! - Routing alerts to the error topic or the findings topic
//! - A single bounded retry per publish
//! - At most one findings alert of each kind per run

mod sns;

pub use sns::SnsChannel;

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::error::FinderError;

pub use async_trait::async_trait;

/// Total publish attempts per alert (one retry)
const DEFAULT_PUBLISH_ATTEMPTS: u32 = 2;

const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

pub const ERROR_SUBJECT: &str = "ElastiCache Graviton Finder Exception";
pub const GRAVITON_SUBJECT: &str = "ElastiCache Graviton Candidates Found";
pub const RESERVATION_SUBJECT: &str = "ElastiCache Reservation Candidates Found";

/// Transport for a single alert publish
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    async fn publish(&self, topic: &str, message: &str, subject: &str) -> Result<(), FinderError>;
}

/// Alert kind; selects the destination topic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertChannel {
    /// Pipeline failures
    Error,
    /// Graviton migration candidates found
    Graviton,
    /// Node types with more deployed than reserved nodes
    Reservation,
}

impl std::fmt::Display for AlertChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertChannel::Error => write!(f, "error"),
            AlertChannel::Graviton => write!(f, "findings-graviton"),
            AlertChannel::Reservation => write!(f, "findings-reservation"),
        }
    }
}

/// Sends alerts to the configured topics
#[derive(Clone)]
pub struct Notifier {
    channel: Arc<dyn NotificationChannel>,
    error_topic: String,
    findings_topic: String,
    max_attempts: u32,
    retry_delay: Duration,
}

impl Notifier {
    pub fn new(
        channel: Arc<dyn NotificationChannel>,
        error_topic: impl Into<String>,
        findings_topic: impl Into<String>,
    ) -> Self {
        Self {
            channel,
            error_topic: error_topic.into(),
            findings_topic: findings_topic.into(),
            max_attempts: DEFAULT_PUBLISH_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Set the total number of publish attempts (at least one)
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Set the pause before the retry
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn topic_for(&self, channel: AlertChannel) -> &str {
        match channel {
            AlertChannel::Error => &self.error_topic,
            AlertChannel::Graviton | AlertChannel::Reservation => &self.findings_topic,
        }
    }

    /// Publish one alert, retrying a failed publish a bounded number of times
    pub async fn alert(
        &self,
        channel: AlertChannel,
        message: &str,
        subject: &str,
    ) -> Result<(), FinderError> {
        let topic = self.topic_for(channel);
        let mut attempt = 1;

        loop {
            match self.channel.publish(topic, message, subject).await {
                Ok(()) => {
                    info!(
                        event = "alert_sent",
                        channel = %channel,
                        topic = %topic,
                        attempt = attempt,
                        subject = %subject,
                        "Alert published"
                    );
                    return Ok(());
                }
                Err(err) if attempt < self.max_attempts => {
                    warn!(
                        event = "alert_retry",
                        channel = %channel,
                        topic = %topic,
                        attempt = attempt,
                        error = %err,
                        "Alert publish failed, retrying"
                    );
                    attempt += 1;
                    if !self.retry_delay.is_zero() {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
                Err(err) => {
                    error!(
                        event = "alert_failed",
                        channel = %channel,
                        topic = %topic,
                        attempts = attempt,
                        error = %err,
                        "Alert publish failed"
                    );
                    return Err(err);
                }
            }
        }
    }

    /// Report a pipeline failure. A failed publish is logged and dropped.
    pub async fn alert_error(&self, message: &str) {
        if self
            .alert(AlertChannel::Error, message, ERROR_SUBJECT)
            .await
            .is_err()
        {
            error!(
                event = "error_alert_dropped",
                topic = %self.error_topic,
                "Could not deliver error alert"
            );
        }
    }
}

/// Findings alerts already sent in the current run
///
/// Each kind fires at most once per run. A silent instance records the
/// findings without publishing anything.
pub struct RunAlerts<'a> {
    notifier: Option<&'a Notifier>,
    report_location: String,
    graviton_sent: bool,
    reservation_sent: bool,
}

impl<'a> RunAlerts<'a> {
    pub fn new(notifier: &'a Notifier, report_location: impl Into<String>) -> Self {
        Self {
            notifier: Some(notifier),
            report_location: report_location.into(),
            graviton_sent: false,
            reservation_sent: false,
        }
    }

    pub fn silent() -> Self {
        Self {
            notifier: None,
            report_location: String::new(),
            graviton_sent: false,
            reservation_sent: false,
        }
    }

    pub fn graviton_sent(&self) -> bool {
        self.graviton_sent
    }

    pub fn reservation_sent(&self) -> bool {
        self.reservation_sent
    }

    /// Announce Graviton candidates unless already done this run
    pub async fn graviton_candidates_found(&mut self) -> Result<(), FinderError> {
        if self.graviton_sent {
            return Ok(());
        }
        if let Some(notifier) = self.notifier {
            let message = format!(
                "ElastiCache nodes candidates for Graviton have been found. See report in S3 bucket: {}",
                self.report_location
            );
            notifier
                .alert(AlertChannel::Graviton, &message, GRAVITON_SUBJECT)
                .await?;
        }
        self.graviton_sent = true;
        Ok(())
    }

    /// Announce reservation candidates unless already done this run
    pub async fn reservation_gap_found(&mut self) -> Result<(), FinderError> {
        if self.reservation_sent {
            return Ok(());
        }
        if let Some(notifier) = self.notifier {
            let message = format!(
                "ElastiCache reserve node candidates have been found. See report in S3 bucket: {}",
                self.report_location
            );
            notifier
                .alert(AlertChannel::Reservation, &message, RESERVATION_SUBJECT)
                .await?;
        }
        self.reservation_sent = true;
        Ok(())
    }
}
