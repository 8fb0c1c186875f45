//! MetricCollectorActor - Scrapes the exporter endpoint
//!
//! ## Message Flow
//!
//! ```text
//! Timer tick → GET /metrics → parse lines → Publish ScrapeEvent → [AlertActor, ...]
//!     ↑
//!     └─── Commands (PollNow, UpdateInterval, Shutdown)
//! ```
//!
//! A failed scrape is logged and published as an event without samples; the
//! actor keeps running and tries again on the next tick.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::interval;
use tracing::{debug, error, instrument, trace, warn};

use crate::{MetricSample, config::TargetConfig, exposition::parse_samples};

use super::messages::{CollectorCommand, ScrapeEvent};

/// Timeout for one scrape request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Actor that scrapes a single target
pub struct MetricCollectorActor {
    target: TargetConfig,

    /// HTTP client (reused across requests)
    client: reqwest::Client,

    command_rx: mpsc::Receiver<CollectorCommand>,

    /// Broadcast sender for publishing scrape results
    scrape_tx: broadcast::Sender<ScrapeEvent>,

    interval_duration: Duration,
}

impl MetricCollectorActor {
    pub fn new(
        target: TargetConfig,
        interval_secs: u64,
        command_rx: mpsc::Receiver<CollectorCommand>,
        scrape_tx: broadcast::Sender<ScrapeEvent>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            target,
            client,
            command_rx,
            scrape_tx,
            interval_duration: Duration::from_secs(interval_secs.max(1)),
        })
    }

    /// Run the actor's main loop
    ///
    /// Runs until a Shutdown command is received or the command channel is
    /// closed. The first scrape happens immediately.
    #[instrument(skip(self), fields(target = %self.target.id()))]
    pub async fn run(mut self) {
        debug!("starting collector actor");

        let mut ticker = interval(self.interval_duration);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    // errors are already logged and published as an empty cycle
                    let _ = self.run_cycle().await;
                }

                Some(cmd) = self.command_rx.recv() => {
                    match cmd {
                        CollectorCommand::PollNow { respond_to } => {
                            debug!("received PollNow command");
                            let result = self.run_cycle().await;
                            let _ = respond_to.send(result);
                        }

                        CollectorCommand::UpdateInterval { interval_secs } => {
                            debug!("updating interval to {interval_secs}s");
                            self.interval_duration = Duration::from_secs(interval_secs.max(1));
                            ticker = interval(self.interval_duration);
                            // the fresh interval would fire immediately
                            ticker.reset();
                        }

                        CollectorCommand::Shutdown => {
                            debug!("received shutdown command");
                            break;
                        }
                    }
                }

                else => {
                    warn!("command channel closed, shutting down");
                    break;
                }
            }
        }

        debug!("collector actor stopped");
    }

    /// Scrape once and publish the result
    ///
    /// On failure an event with zero samples is published and the error is
    /// returned to the caller.
    async fn run_cycle(&self) -> Result<usize> {
        let result = self.scrape().await;

        let samples = match &result {
            Ok(samples) => samples.clone(),
            Err(e) => {
                error!("failed to fetch metrics: {e:#}");
                vec![]
            }
        };

        let sample_count = samples.len();
        let event = ScrapeEvent {
            target: self.target.id(),
            samples,
            timestamp: Utc::now(),
        };

        // It's OK if there are no subscribers.
        match self.scrape_tx.send(event) {
            Ok(num_receivers) => {
                trace!("published scrape event to {num_receivers} receivers");
            }
            Err(_) => {
                trace!("no receivers for scrape event");
            }
        }

        result.map(|_| sample_count)
    }

    /// Fetch `/metrics` and parse the body
    async fn scrape(&self) -> Result<Vec<MetricSample>> {
        let url = self.target.url();

        trace!("requesting metrics from {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("failed to send HTTP request")?;

        if !response.status().is_success() {
            anyhow::bail!("HTTP error: {}", response.status());
        }

        let body = response
            .text()
            .await
            .context("failed to read response body")?;

        Ok(parse_samples(&body))
    }
}

/// Handle for controlling a MetricCollectorActor
///
/// Can be cloned and shared across tasks.
#[derive(Clone)]
pub struct CollectorHandle {
    sender: mpsc::Sender<CollectorCommand>,

    /// Target ID (host:port format)
    pub target: String,
}

impl CollectorHandle {
    /// Create the actor, spawn it as a tokio task and return a handle to it.
    pub fn spawn(
        target: TargetConfig,
        interval_secs: u64,
        scrape_tx: broadcast::Sender<ScrapeEvent>,
    ) -> Result<Self> {
        let (handle, actor) = Self::build(target, interval_secs, scrape_tx)?;

        tokio::spawn(actor.run());

        Ok(handle)
    }

    /// Create the actor without spawning it, for callers that supervise the task.
    pub fn build(
        target: TargetConfig,
        interval_secs: u64,
        scrape_tx: broadcast::Sender<ScrapeEvent>,
    ) -> Result<(Self, MetricCollectorActor)> {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);

        let target_id = target.id();
        let actor = MetricCollectorActor::new(target, interval_secs, cmd_rx, scrape_tx)?;

        let handle = Self {
            sender: cmd_tx,
            target: target_id,
        };

        Ok((handle, actor))
    }

    /// Scrape immediately and return the number of parsed samples
    pub async fn poll_now(&self) -> Result<usize> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(CollectorCommand::PollNow { respond_to: tx })
            .await
            .context("failed to send PollNow command")?;

        rx.await.context("failed to receive response")?
    }

    pub async fn update_interval(&self, interval_secs: u64) -> Result<()> {
        self.sender
            .send(CollectorCommand::UpdateInterval { interval_secs })
            .await
            .context("failed to send UpdateInterval command")?;
        Ok(())
    }

    /// Gracefully shut down the collector
    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .send(CollectorCommand::Shutdown)
            .await
            .context("failed to send Shutdown command")?;
        Ok(())
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}
