//! Wires the actors together and keeps them alive

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::broadcast;
use tracing::{debug, error, info, instrument};

use crate::{
    actors::{alert::AlertHandle, collector::CollectorHandle, messages::ScrapeEvent},
    config::Config,
    notify::{Notifier, notifiers_from_config},
    rules::RuleSet,
};

/// Pause before restarting an actor task that died unexpectedly
pub const FALLBACK_RETRY_INTERVAL: Duration = Duration::from_secs(60);

/// Capacity of the scrape event channel
const SCRAPE_CHANNEL_CAPACITY: usize = 16;

/// Run the monitor until the collector shuts down.
#[instrument(skip_all, fields(target = %config.node_exporter.id()))]
pub async fn run(config: Config) -> Result<()> {
    let notifiers = notifiers_from_config(&config).context("failed to set up notifiers")?;

    info!(
        "starting node exporter monitoring of {} with {} rules every {}s",
        config.node_exporter.url(),
        config.rules.len(),
        config.check_interval
    );

    let (scrape_tx, scrape_rx) = broadcast::channel::<ScrapeEvent>(SCRAPE_CHANNEL_CAPACITY);

    let alerts = tokio::spawn(supervise_alerts(
        config.rules.clone(),
        notifiers,
        scrape_tx.clone(),
        scrape_rx,
        FALLBACK_RETRY_INTERVAL,
    ));

    let result = supervise_collector(&config, scrape_tx, FALLBACK_RETRY_INTERVAL).await;

    // Dropping the supervisor's sender closes the scrape channel, which stops
    // the running alert actor.
    alerts.abort();
    result
}

/// Run the collector task, restarting it after `fallback` whenever it panics.
///
/// Returns once the collector stops on its own.
pub async fn supervise_collector(
    config: &Config,
    scrape_tx: broadcast::Sender<ScrapeEvent>,
    fallback: Duration,
) -> Result<()> {
    loop {
        let (handle, actor) = CollectorHandle::build(
            config.node_exporter.clone(),
            config.check_interval,
            scrape_tx.clone(),
        )?;

        match tokio::spawn(actor.run()).await {
            Ok(()) => {
                debug!("collector for {} stopped", handle.target());
                return Ok(());
            }
            Err(e) => {
                error!("error in monitoring loop: {e}");
                tokio::time::sleep(fallback).await;
            }
        }
    }
}

/// Run the alert actor task, restarting it after `fallback` whenever it panics.
///
/// The first actor reads from `scrape_rx`. Every restart subscribes to
/// `scrape_tx` afresh, so scrapes published while no actor is running are not
/// evaluated. Returns once the actor stops on its own.
pub async fn supervise_alerts(
    rules: RuleSet,
    notifiers: Vec<Arc<dyn Notifier>>,
    scrape_tx: broadcast::Sender<ScrapeEvent>,
    mut scrape_rx: broadcast::Receiver<ScrapeEvent>,
    fallback: Duration,
) {
    loop {
        let (_handle, actor) = AlertHandle::build(rules.clone(), notifiers.clone(), scrape_rx);

        match tokio::spawn(actor.run()).await {
            Ok(()) => {
                debug!("alert actor stopped");
                return;
            }
            Err(e) => {
                error!("error in monitoring loop: {e}");
                tokio::time::sleep(fallback).await;
                scrape_rx = scrape_tx.subscribe();
            }
        }
    }
}
