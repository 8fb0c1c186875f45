//! Integration tests for the full actor pipeline
//!
//! Collector → AlertActor → webhook receiver

use pretty_assertions::assert_eq;
use tokio::sync::broadcast;
use vigil::actors::{alert::AlertHandle, collector::CollectorHandle};
use vigil::rules::RuleSet;

use crate::helpers::*;

#[tokio::test]
async fn test_scrape_flows_from_collector_to_webhook() {
    let exporter = start_exporter(NODE_EXPORTER_BODY).await;
    let receiver = start_webhook_receiver(200).await;

    let (scrape_tx, scrape_rx) = broadcast::channel(16);
    let alert_handle = AlertHandle::spawn(node_rules(), webhook_notifiers(&receiver), scrape_rx);
    let collector_handle = CollectorHandle::spawn(mock_target(&exporter), 600, scrape_tx).unwrap();

    // the first tick scrapes right away
    let stats = wait_for_cycles(&alert_handle, 1).await;
    assert_eq!(stats.last_cycle_alerts, 2);
    assert_eq!(stats.notifications_sent, 1);

    let payloads = received_payloads(&receiver).await;
    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0]["alerts"], 2);
    assert_eq!(
        payloads[0]["body"],
        "The following issues were detected:\n\n\
         node_cpu_seconds_total is 95.2, which is greater than 90\n\
         node_filesystem_avail_bytes is 500000000, which is less than 1000000000"
    );

    collector_handle.shutdown().await.unwrap();
    alert_handle.shutdown().await;
}

#[tokio::test]
async fn test_every_poll_is_one_notification() {
    let exporter = start_exporter(NODE_EXPORTER_BODY).await;
    let receiver = start_webhook_receiver(200).await;

    let (scrape_tx, scrape_rx) = broadcast::channel(16);
    let alert_handle = AlertHandle::spawn(node_rules(), webhook_notifiers(&receiver), scrape_rx);
    let collector_handle = CollectorHandle::spawn(mock_target(&exporter), 600, scrape_tx).unwrap();

    wait_for_cycles(&alert_handle, 1).await;

    for _ in 0..3 {
        assert_eq!(collector_handle.poll_now().await.unwrap(), 5);
    }

    let stats = wait_for_cycles(&alert_handle, 4).await;
    assert_eq!(stats.alerts_found, 8);
    assert_eq!(stats.notifications_sent, 4);
    assert_eq!(received_payloads(&receiver).await.len(), 4);

    collector_handle.shutdown().await.unwrap();
    alert_handle.shutdown().await;
}

#[tokio::test]
async fn test_unmatched_metrics_send_nothing() {
    let exporter = start_exporter(NODE_EXPORTER_BODY).await;
    let receiver = start_webhook_receiver(200).await;

    let mut rules = RuleSet::new();
    rules.insert("node_memory_MemAvailable_bytes", vigil::rules::Rule::less_than(1.0));

    let (scrape_tx, scrape_rx) = broadcast::channel(16);
    let alert_handle = AlertHandle::spawn(rules, webhook_notifiers(&receiver), scrape_rx);
    let collector_handle = CollectorHandle::spawn(mock_target(&exporter), 600, scrape_tx).unwrap();

    let stats = wait_for_cycles(&alert_handle, 1).await;
    assert_eq!(stats.alerts_found, 0);
    assert!(received_payloads(&receiver).await.is_empty());

    collector_handle.shutdown().await.unwrap();
    alert_handle.shutdown().await;
}

#[tokio::test]
async fn test_comments_only_scrape() {
    let exporter = start_exporter(
        "# HELP node_load1 1m load average.\n# TYPE node_load1 gauge\n",
    )
    .await;
    let receiver = start_webhook_receiver(200).await;

    let (scrape_tx, scrape_rx) = broadcast::channel(16);
    let alert_handle = AlertHandle::spawn(node_rules(), webhook_notifiers(&receiver), scrape_rx);
    let collector_handle = CollectorHandle::spawn(mock_target(&exporter), 600, scrape_tx).unwrap();

    wait_for_cycles(&alert_handle, 1).await;
    assert_eq!(collector_handle.poll_now().await.unwrap(), 0);

    let stats = wait_for_cycles(&alert_handle, 2).await;
    assert_eq!(stats.alerts_found, 0);
    assert!(received_payloads(&receiver).await.is_empty());

    collector_handle.shutdown().await.unwrap();
    alert_handle.shutdown().await;
}
