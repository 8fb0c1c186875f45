//! AlertActor - Evaluates scrapes and sends notifications
//!
//! Every [`ScrapeEvent`] is one cycle:
//!
//! ```text
//! ScrapeEvent → RuleSet::evaluate_batch → alerts?
//!                                           │ none → log "found 0 alerts"
//!                                           │ some → Notification → every Notifier
//! ```
//!
//! A failing notifier is logged and its copy of the batch is dropped. Nothing is
//! retried; the next cycle evaluates fresh samples.

use std::sync::Arc;

use chrono::Local;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, error, info, instrument, warn};

use crate::notify::{Notification, Notifier};
use crate::rules::RuleSet;

use super::messages::{AlertCommand, AlertStats, ScrapeEvent};

/// Actor that evaluates rules and dispatches notifications
pub struct AlertActor {
    rules: RuleSet,

    notifiers: Vec<Arc<dyn Notifier>>,

    command_rx: mpsc::Receiver<AlertCommand>,

    /// Scrape event receiver (broadcast subscription)
    scrape_rx: broadcast::Receiver<ScrapeEvent>,

    /// Whether notifications are muted
    muted: bool,

    stats: AlertStats,
}

impl AlertActor {
    pub fn new(
        rules: RuleSet,
        notifiers: Vec<Arc<dyn Notifier>>,
        command_rx: mpsc::Receiver<AlertCommand>,
        scrape_rx: broadcast::Receiver<ScrapeEvent>,
    ) -> Self {
        Self {
            rules,
            notifiers,
            command_rx,
            scrape_rx,
            muted: false,
            stats: AlertStats::default(),
        }
    }

    /// Run the actor's main loop
    #[instrument(skip(self))]
    pub async fn run(mut self) {
        debug!(
            "starting alert actor with {} rules and {} notifiers",
            self.rules.len(),
            self.notifiers.len()
        );

        loop {
            tokio::select! {
                result = self.scrape_rx.recv() => {
                    match result {
                        Ok(event) => self.handle_scrape_event(event).await,
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!("alert actor lagged, skipped {skipped} scrapes");
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            warn!("scrape channel closed, shutting down");
                            break;
                        }
                    }
                }

                Some(cmd) = self.command_rx.recv() => {
                    match cmd {
                        AlertCommand::GetStats { respond_to } => {
                            let _ = respond_to.send(self.stats.clone());
                        }

                        AlertCommand::Mute => {
                            debug!("muting notifications");
                            self.muted = true;
                        }

                        AlertCommand::Unmute => {
                            debug!("unmuting notifications");
                            self.muted = false;
                        }

                        AlertCommand::Shutdown => {
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

        debug!("alert actor stopped");
    }

    #[instrument(skip(self, event), fields(target = %event.target))]
    async fn handle_scrape_event(&mut self, event: ScrapeEvent) {
        let alerts = self.rules.evaluate_batch(&event.samples);

        self.stats.cycles += 1;
        self.stats.alerts_found += alerts.len() as u64;
        self.stats.last_cycle_alerts = alerts.len();

        if !alerts.is_empty() {
            if self.muted {
                debug!("notifications muted, dropping {} alerts", alerts.len());
            } else {
                let notification =
                    Notification::from_alerts(&alerts, event.timestamp.with_timezone(&Local));
                self.dispatch(&notification).await;
            }
        }

        info!("check completed - found {} alerts", alerts.len());
    }

    async fn dispatch(&mut self, notification: &Notification) {
        if self.notifiers.is_empty() {
            warn!("no notifier configured, alerts are only logged");
            info!("{}", notification.body);
            return;
        }

        for notifier in &self.notifiers {
            match notifier.send(notification).await {
                Ok(()) => self.stats.notifications_sent += 1,
                Err(e) => {
                    self.stats.notification_failures += 1;
                    error!("failed to send {} notification: {e}", notifier.name());
                }
            }
        }
    }
}

/// Handle for controlling the AlertActor
#[derive(Clone)]
pub struct AlertHandle {
    sender: mpsc::Sender<AlertCommand>,
}

impl AlertHandle {
    /// Spawn a new alert actor
    ///
    /// # Arguments
    /// - `rules`: Rules keyed by metric name
    /// - `notifiers`: Transports every notification is sent through
    /// - `scrape_rx`: Broadcast receiver for scrape events
    pub fn spawn(
        rules: RuleSet,
        notifiers: Vec<Arc<dyn Notifier>>,
        scrape_rx: broadcast::Receiver<ScrapeEvent>,
    ) -> Self {
        let (handle, actor) = Self::build(rules, notifiers, scrape_rx);

        tokio::spawn(actor.run());

        handle
    }

    /// Create the actor without spawning it, for callers that supervise its task
    pub fn build(
        rules: RuleSet,
        notifiers: Vec<Arc<dyn Notifier>>,
        scrape_rx: broadcast::Receiver<ScrapeEvent>,
    ) -> (Self, AlertActor) {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);

        let actor = AlertActor::new(rules, notifiers, cmd_rx, scrape_rx);

        (Self { sender: cmd_tx }, actor)
    }

    /// Current counters, or `None` if the actor is gone
    pub async fn get_stats(&self) -> Option<AlertStats> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(AlertCommand::GetStats { respond_to: tx })
            .await
            .ok()?;

        rx.await.ok()
    }

    pub async fn mute(&self) {
        let _ = self.sender.send(AlertCommand::Mute).await;
    }

    pub async fn unmute(&self) {
        let _ = self.sender.send(AlertCommand::Unmute).await;
    }

    /// Gracefully shut down the alert actor
    pub async fn shutdown(&self) {
        let _ = self.sender.send(AlertCommand::Shutdown).await;
    }
}
