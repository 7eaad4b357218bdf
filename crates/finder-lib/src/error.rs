//! Error types for the finder pipeline

use thiserror::Error;

/// Errors raised while loading configuration from the environment
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is unset or empty
    #[error("missing required configuration option {0}")]
    Missing(&'static str),

    /// The configuration source could not be read or deserialized
    #[error("invalid configuration: {0}")]
    Invalid(#[from] config::ConfigError),
}

/// Errors that abort a pipeline run
#[derive(Debug, Error)]
pub enum FinderError {
    /// Cluster or reservation enumeration failed (network, auth, throttling)
    #[error("inventory enumeration failed: {0}")]
    Inventory(String),

    /// An artifact could not be uploaded to the object store
    #[error("upload of s3://{bucket}/{key} failed: {message}")]
    Upload {
        bucket: String,
        key: String,
        message: String,
    },

    /// A notification could not be published after the retry
    #[error("publishing to {topic} failed: {message}")]
    Notify { topic: String, message: String },

    /// A report could not be rendered or written locally
    #[error("report {file} could not be written: {message}")]
    Report { file: String, message: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl FinderError {
    /// Short stage label used in structured logs
    pub fn stage(&self) -> &'static str {
        match self {
            FinderError::Inventory(_) => "inventory",
            FinderError::Upload { .. } => "upload",
            FinderError::Notify { .. } => "notify",
            FinderError::Report { .. } => "report",
            FinderError::Config(_) => "config",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_error_message() {
        let err = FinderError::Upload {
            bucket: "reports".to_string(),
            key: "graviton/elasticache-graviton.csv".to_string(),
            message: "AccessDenied".to_string(),
        };

        assert_eq!(
            err.to_string(),
            "upload of s3://reports/graviton/elasticache-graviton.csv failed: AccessDenied"
        );
        assert_eq!(err.stage(), "upload");
    }

    #[test]
    fn test_missing_config_is_wrapped() {
        let err: FinderError = ConfigError::Missing("BUCKET_NAME").into();
        assert!(err.to_string().contains("BUCKET_NAME"));
        assert_eq!(err.stage(), "config");
    }
}
