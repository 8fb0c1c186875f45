pub mod actors;
pub mod config;
pub mod exposition;
pub mod logging;
pub mod monitor;
pub mod notify;
pub mod rules;
pub mod util;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One observation parsed from a line of the text exposition format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub name: String,
    pub value: f64,
    pub labels: HashMap<String, String>,
}

impl MetricSample {
    pub fn new(name: impl ToString, value: f64) -> Self {
        Self {
            name: name.to_string(),
            value,
            labels: HashMap::new(),
        }
    }

    pub fn with_label(mut self, name: impl ToString, value: impl ToString) -> Self {
        self.labels.insert(name.to_string(), value.to_string());
        self
    }

    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels.get(name).map(String::as_str)
    }
}
