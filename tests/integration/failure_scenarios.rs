//! Failure tests for the scrape pipeline
//!
//! - Unreachable exporter
//! - Exporter errors
//! - Notification failures

use pretty_assertions::assert_eq;
use tokio::sync::broadcast;
use vigil::actors::{alert::AlertHandle, collector::CollectorHandle};
use vigil::config::TargetConfig;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::helpers::*;

#[tokio::test]
async fn test_unreachable_exporter_is_an_empty_cycle() {
    let receiver = start_webhook_receiver(200).await;
    let target = TargetConfig {
        host: "127.0.0.1".to_string(),
        port: 9,
    };

    let (scrape_tx, scrape_rx) = broadcast::channel(16);
    let alert_handle = AlertHandle::spawn(node_rules(), webhook_notifiers(&receiver), scrape_rx);
    let collector_handle = CollectorHandle::spawn(target, 600, scrape_tx).unwrap();

    assert!(collector_handle.poll_now().await.is_err());

    // first tick plus the manual poll, both empty
    let stats = wait_for_cycles(&alert_handle, 2).await;
    assert_eq!(stats.alerts_found, 0);
    assert_eq!(stats.last_cycle_alerts, 0);
    assert!(received_payloads(&receiver).await.is_empty());

    collector_handle.shutdown().await.unwrap();
    alert_handle.shutdown().await;
}

#[tokio::test]
async fn test_exporter_500_then_recovery() {
    let exporter = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/metrics"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&exporter)
        .await;

    Mock::given(method("GET"))
        .and(path("/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_string(NODE_EXPORTER_BODY))
        .mount(&exporter)
        .await;

    let (scrape_tx, scrape_rx) = broadcast::channel(16);
    let alert_handle = AlertHandle::spawn(node_rules(), vec![], scrape_rx);
    let collector_handle = CollectorHandle::spawn(mock_target(&exporter), 600, scrape_tx).unwrap();

    let stats = wait_for_cycles(&alert_handle, 1).await;
    assert_eq!(stats.last_cycle_alerts, 0);

    // the collector keeps going after a failed scrape
    assert_eq!(collector_handle.poll_now().await.unwrap(), 5);

    let stats = wait_for_cycles(&alert_handle, 2).await;
    assert_eq!(stats.last_cycle_alerts, 2);

    collector_handle.shutdown().await.unwrap();
    alert_handle.shutdown().await;
}

#[tokio::test]
async fn test_failed_notification_is_dropped() {
    let exporter = start_exporter(NODE_EXPORTER_BODY).await;
    let receiver = start_webhook_receiver(500).await;

    let (scrape_tx, scrape_rx) = broadcast::channel(16);
    let alert_handle = AlertHandle::spawn(node_rules(), webhook_notifiers(&receiver), scrape_rx);
    let collector_handle = CollectorHandle::spawn(mock_target(&exporter), 600, scrape_tx).unwrap();

    let stats = wait_for_cycles(&alert_handle, 1).await;
    assert_eq!(stats.notification_failures, 1);
    assert_eq!(stats.notifications_sent, 0);

    // no retry: exactly one delivery attempt for the cycle
    assert_eq!(received_payloads(&receiver).await.len(), 1);

    collector_handle.shutdown().await.unwrap();
    alert_handle.shutdown().await;
}

#[tokio::test]
async fn test_muted_pipeline_sends_nothing() {
    let exporter = start_exporter(NODE_EXPORTER_BODY).await;
    let receiver = start_webhook_receiver(200).await;

    let (scrape_tx, scrape_rx) = broadcast::channel(16);
    let alert_handle = AlertHandle::spawn(node_rules(), webhook_notifiers(&receiver), scrape_rx);
    alert_handle.mute().await;
    // make sure the mute is applied before the first scrape arrives
    alert_handle.get_stats().await.unwrap();

    let collector_handle = CollectorHandle::spawn(mock_target(&exporter), 600, scrape_tx).unwrap();

    let stats = wait_for_cycles(&alert_handle, 1).await;
    assert_eq!(stats.alerts_found, 2);
    assert!(received_payloads(&receiver).await.is_empty());

    collector_handle.shutdown().await.unwrap();
    alert_handle.shutdown().await;
}
