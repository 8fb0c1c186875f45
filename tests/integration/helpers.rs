//! Test helpers and utilities for integration tests

use std::sync::Arc;
use std::time::Duration;

use vigil::{
    actors::alert::AlertHandle,
    actors::messages::AlertStats,
    config::{TargetConfig, WebhookConfig},
    notify::{Notifier, WebhookNotifier},
    rules::{Rule, RuleSet},
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A small node-exporter style scrape body
pub const NODE_EXPORTER_BODY: &str = r#"# HELP node_cpu_seconds_total Seconds the CPUs spent in each mode.
# TYPE node_cpu_seconds_total counter
node_cpu_seconds_total{cpu="0",mode="idle"} 95.2
node_cpu_seconds_total{cpu="0",mode="system"} 3.1
# HELP node_load1 1m load average.
# TYPE node_load1 gauge
node_load1 0.42
# HELP node_filesystem_avail_bytes Filesystem space available to non-root users in bytes.
# TYPE node_filesystem_avail_bytes gauge
node_filesystem_avail_bytes{device="/dev/sda1",fstype="ext4",mountpoint="/"} 5.0e+08
node_filesystem_avail_bytes{device="/dev/sda2",fstype="ext4",mountpoint="/home"} 2.5e+11
"#;

/// Target config pointing at a mock server
pub fn mock_target(mock_server: &MockServer) -> TargetConfig {
    let mock_url = url::Url::parse(&mock_server.uri()).unwrap();

    TargetConfig {
        host: mock_url.host_str().unwrap().to_string(),
        port: mock_url.port().unwrap(),
    }
}

/// Start a mock exporter answering `/metrics` with `body`
pub async fn start_exporter(body: &str) -> MockServer {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&mock_server)
        .await;

    mock_server
}

/// Start a mock webhook receiver answering with `status`
pub async fn start_webhook_receiver(status: u16) -> MockServer {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(status))
        .mount(&mock_server)
        .await;

    mock_server
}

pub fn webhook_notifiers(receiver: &MockServer) -> Vec<Arc<dyn Notifier>> {
    let notifier = WebhookNotifier::new(&WebhookConfig {
        url: format!("{}/hook", receiver.uri()),
    })
    .unwrap();

    vec![Arc::new(notifier)]
}

/// Rules used across the pipeline tests
pub fn node_rules() -> RuleSet {
    let mut rules = RuleSet::new();
    rules.insert("node_cpu_seconds_total", Rule::greater_than(90.0));
    rules.insert("node_load1", Rule::greater_than(4.0));
    rules.insert(
        "node_filesystem_avail_bytes",
        Rule::less_than(1e9).with_label_match(
            "mountpoint",
            vigil::rules::LabelPattern::new("/$").unwrap(),
        ),
    );
    rules
}

/// Poll the alert actor until it has evaluated `cycles` scrapes
pub async fn wait_for_cycles(handle: &AlertHandle, cycles: u64) -> AlertStats {
    for _ in 0..100 {
        let stats = handle.get_stats().await.expect("alert actor is running");
        if stats.cycles >= cycles {
            return stats;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("alert actor did not evaluate {cycles} cycles in time");
}

/// JSON bodies of every request the receiver got
pub async fn received_payloads(receiver: &MockServer) -> Vec<serde_json::Value> {
    receiver
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| serde_json::from_slice(&request.body).unwrap())
        .collect()
}
