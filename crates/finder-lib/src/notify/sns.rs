//! SNS notification channel

use aws_sdk_sns::error::DisplayErrorContext;
use aws_sdk_sns::Client;

use super::{async_trait, NotificationChannel};
use crate::error::FinderError;

/// Publishes alerts to SNS topics
#[derive(Clone)]
pub struct SnsChannel {
    client: Client,
}

impl SnsChannel {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_conf(sdk_config: &aws_config::SdkConfig) -> Self {
        Self::new(Client::new(sdk_config))
    }
}

#[async_trait]
impl NotificationChannel for SnsChannel {
    async fn publish(&self, topic: &str, message: &str, subject: &str) -> Result<(), FinderError> {
        self.client
            .publish()
            .topic_arn(topic)
            .message(message)
            .subject(subject)
            .send()
            .await
            .map_err(|e| FinderError::Notify {
                topic: topic.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;
        Ok(())
    }
}
