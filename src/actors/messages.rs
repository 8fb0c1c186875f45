//! Message types for actor communication
//!
//! 1. **Commands**: Request/response messages sent to one actor via mpsc
//! 2. **Events**: Scrape results broadcast to every subscriber

use chrono::{DateTime, Utc};
use tokio::sync::oneshot;

use crate::MetricSample;

/// Event published once per scrape cycle
///
/// A failed fetch is published with an empty sample list, so subscribers
/// still see every cycle.
#[derive(Debug, Clone)]
pub struct ScrapeEvent {
    /// Scrape target (format: "host:port")
    pub target: String,

    /// Samples parsed from the response body, in body order
    pub samples: Vec<MetricSample>,

    /// When the scrape finished
    pub timestamp: DateTime<Utc>,
}

/// Commands that can be sent to a MetricCollectorActor
#[derive(Debug)]
pub enum CollectorCommand {
    /// Scrape immediately, bypassing the interval timer
    PollNow {
        /// Receives the number of parsed samples, or the fetch error
        respond_to: oneshot::Sender<anyhow::Result<usize>>,
    },

    /// Change the scrape interval; the timer restarts right away
    UpdateInterval { interval_secs: u64 },

    /// Gracefully shut down the collector
    Shutdown,
}

/// Commands that can be sent to the AlertActor
#[derive(Debug)]
pub enum AlertCommand {
    GetStats {
        respond_to: oneshot::Sender<AlertStats>,
    },

    /// Keep evaluating, but stop sending notifications
    Mute,

    Unmute,

    /// Gracefully shut down the alert actor
    Shutdown,
}

/// Counters kept by the AlertActor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertStats {
    /// Scrape events evaluated
    pub cycles: u64,

    /// Alerts produced over all cycles
    pub alerts_found: u64,

    pub notifications_sent: u64,

    pub notification_failures: u64,

    /// Alerts produced by the most recent cycle
    pub last_cycle_alerts: usize,
}
