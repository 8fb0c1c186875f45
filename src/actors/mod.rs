//! Actor-based scrape pipeline
//!
//! Each actor runs as an independent tokio task communicating via channels.
//!
//! ```text
//!   ┌────────────────────┐   ScrapeEvent    ┌────────────────┐
//!   │ MetricCollector    │ ───────────────→ │  AlertActor    │ ──→ Notifiers
//!   │ (GET /metrics)     │   (broadcast)    │ (RuleSet)      │     (email, webhook)
//!   └────────────────────┘                  └────────────────┘
//!            ↑                                      ↑
//!      CollectorCommand                        AlertCommand
//!          (mpsc)                                 (mpsc)
//! ```
//!
//! 1. **Commands**: Each actor has an mpsc command channel for control messages
//! 2. **Events**: The collector publishes one event per scrape cycle
//! 3. **Request/Response**: oneshot channels for synchronous queries

pub mod alert;
pub mod collector;
pub mod messages;
