//! Finder configuration
//!
//! All options are read from the process environment. Required options
//! are validated up front so a misconfigured deployment fails before any
//! client is built.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Raw environment view; every key is optional until validated
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    graviton_redis_supported_version: Option<String>,
    graviton_memcached_supported_version: Option<String>,
    bucket_name: Option<String>,
    bucket_path: Option<String>,
    sns_topic_arn_alert: Option<String>,
    sns_topic: Option<String>,
    region: Option<String>,
    node_size_family: Option<String>,
    graviton_node_marker: Option<String>,
    report_dir: Option<PathBuf>,
    run_timeout_secs: Option<u64>,
}

/// Validated finder configuration
#[derive(Debug, Clone, Serialize)]
pub struct FinderConfig {
    /// Minimum redis version that runs on Graviton
    pub redis_min_version: String,
    /// Minimum memcached version that runs on Graviton
    pub memcached_min_version: String,
    /// Bucket receiving both reports
    pub bucket_name: String,
    /// Key prefix inside the bucket
    pub bucket_path: String,
    /// Topic for pipeline failures
    pub alert_topic: String,
    /// Topic for candidate and reservation findings
    pub findings_topic: String,
    /// Inventory region; the SDK default chain applies when unset
    pub region: Option<String>,
    /// Substring a node type must contain to be analysed
    pub size_family: String,
    /// Substring marking node types already on Graviton
    pub graviton_marker: String,
    /// Local directory the reports are written to before upload
    pub report_dir: PathBuf,
    /// Deadline for a single invocation in seconds
    pub run_timeout_secs: u64,
}

fn default_size_family() -> String {
    "large".to_string()
}

fn default_graviton_marker() -> String {
    "6g.".to_string()
}

fn default_report_dir() -> PathBuf {
    PathBuf::from("/tmp")
}

fn default_run_timeout() -> u64 {
    900
}

fn required(value: Option<String>, name: &'static str) -> Result<String, ConfigError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn optional(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl FinderConfig {
    /// Load configuration from the process environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_environment(config::Environment::default())
    }

    /// Load configuration from an explicit set of variables
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let source: config::Map<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::from_environment(config::Environment::default().source(Some(source)))
    }

    fn from_environment(environment: config::Environment) -> Result<Self, ConfigError> {
        let raw: RawConfig = config::Config::builder()
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        Ok(Self {
            redis_min_version: required(
                raw.graviton_redis_supported_version,
                "GRAVITON_REDIS_SUPPORTED_VERSION",
            )?,
            memcached_min_version: required(
                raw.graviton_memcached_supported_version,
                "GRAVITON_MEMCACHED_SUPPORTED_VERSION",
            )?,
            bucket_name: required(raw.bucket_name, "BUCKET_NAME")?,
            bucket_path: required(raw.bucket_path, "BUCKET_PATH")?,
            alert_topic: required(raw.sns_topic_arn_alert, "SNS_TOPIC_ARN_ALERT")?,
            findings_topic: required(raw.sns_topic, "SNS_TOPIC")?,
            region: optional(raw.region),
            size_family: optional(raw.node_size_family).unwrap_or_else(default_size_family),
            graviton_marker: optional(raw.graviton_node_marker)
                .unwrap_or_else(default_graviton_marker),
            report_dir: raw.report_dir.unwrap_or_else(default_report_dir),
            run_timeout_secs: raw.run_timeout_secs.unwrap_or_else(default_run_timeout),
        })
    }

    /// `bucket/path` as shown in findings alerts
    pub fn report_location(&self) -> String {
        format!("{}/{}", self.bucket_name, self.bucket_path)
    }

    /// Object key for a report file
    pub fn object_key(&self, file_name: &str) -> String {
        format!("{}/{}", self.bucket_path, file_name)
    }

    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_secs)
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> FinderConfig {
    FinderConfig {
        redis_min_version: "6.0".to_string(),
        memcached_min_version: "1.6".to_string(),
        bucket_name: "reports".to_string(),
        bucket_path: "elasticache".to_string(),
        alert_topic: "arn:aws:sns:us-east-1:123456789012:finder-alerts".to_string(),
        findings_topic: "arn:aws:sns:us-east-1:123456789012:finder-findings".to_string(),
        region: None,
        size_family: default_size_family(),
        graviton_marker: default_graviton_marker(),
        report_dir: default_report_dir(),
        run_timeout_secs: default_run_timeout(),
    }
}
