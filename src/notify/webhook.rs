use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde_json::json;
use tracing::{info, instrument};

use super::{Notification, Notifier, NotifyError, NotifyResult};
use crate::config::WebhookConfig;

/// Posts notifications as JSON to an HTTP endpoint
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(config: &WebhookConfig) -> NotifyResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn name(&self) -> &str {
        "webhook"
    }

    #[instrument(skip_all, fields(url = %self.url))]
    async fn send(&self, notification: &Notification) -> NotifyResult<()> {
        let payload = json!({
            "subject": notification.subject,
            "body": notification.body,
            "alerts": notification.alert_count,
            "timestamp": Utc::now().to_rfc3339()
        });

        let response = self.client.post(&self.url).json(&payload).send().await?;

        if !response.status().is_success() {
            return Err(NotifyError::Status(response.status().as_u16()));
        }

        info!("alert webhook sent: {}", notification.subject);
        Ok(())
    }
}
