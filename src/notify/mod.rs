//! Alert notifications
//!
//! One [`Notification`] is built per scan that found at least one alert. It is
//! handed to every configured [`Notifier`]. Delivery failures are reported to the
//! caller, which logs them and drops the batch; nothing is retried or queued.

pub mod email;
pub mod error;
pub mod webhook;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Local};

use crate::config::Config;
use crate::rules::Alert;

pub use email::EmailNotifier;
pub use error::{NotifyError, NotifyResult};
pub use webhook::WebhookNotifier;

/// Sentence put in front of the alert list in every notification body
pub const BODY_HEADER: &str = "The following issues were detected:";

/// Subject and body of one scan's alert notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub body: String,
    pub alert_count: usize,
}

impl Notification {
    pub fn from_alerts(alerts: &[Alert], detected_at: DateTime<Local>) -> Self {
        let lines = alerts
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            subject: format!(
                "Node Exporter Alert - {}",
                detected_at.format("%Y-%m-%d %H:%M:%S")
            ),
            body: format!("{BODY_HEADER}\n\n{lines}"),
            alert_count: alerts.len(),
        }
    }
}

/// Delivery transport for notifications
///
/// Implementations must be `Send + Sync` as they are shared with the alert actor.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Short transport name used in log lines
    fn name(&self) -> &str;

    async fn send(&self, notification: &Notification) -> NotifyResult<()>;
}

/// Build every notifier present in the configuration.
pub fn notifiers_from_config(config: &Config) -> NotifyResult<Vec<Arc<dyn Notifier>>> {
    let mut notifiers: Vec<Arc<dyn Notifier>> = vec![];

    if let Some(email) = &config.email {
        notifiers.push(Arc::new(EmailNotifier::new(email)?));
    }

    if let Some(webhook) = &config.webhook {
        notifiers.push(Arc::new(WebhookNotifier::new(webhook)?));
    }

    Ok(notifiers)
}
