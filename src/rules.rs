//! Threshold rules and their evaluation
//!
//! A [`RuleSet`] maps a metric name to exactly one [`Rule`]. A rule may
//! restrict the samples it looks at by label (`label_match`) and defines any
//! subset of the `gt`, `lt` and `eq` thresholds.
//!
//! ## Evaluation order
//!
//! ```text
//! label_match (all must match) ── no ──→ no alert
//!        │ yes
//!        ▼
//!   gt? value > gt ── yes ──→ "… which is greater than gt"
//!        │ no
//!   lt? value < lt ── yes ──→ "… which is less than lt"
//!        │ no
//!   eq? value == eq ─ yes ──→ "… which equals eq"
//!        │ no
//!        ▼
//!     no alert
//! ```
//!
//! Only the first matching comparison is reported, so a single sample yields at
//! most one alert. Thresholds are optional values: a threshold of `0` is
//! configured and compared like any other number.

use std::collections::HashMap;
use std::fmt;

use regex::Regex;
use serde::Deserialize;

use crate::MetricSample;

/// Regular expression matched against the start of a label value
#[derive(Debug, Clone)]
pub struct LabelPattern {
    source: String,
    regex: Regex,
}

impl LabelPattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{pattern})"))?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// The pattern as it was written in the configuration
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

impl<'de> Deserialize<'de> for LabelPattern {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let pattern = String::deserialize(deserializer)?;
        LabelPattern::new(&pattern).map_err(|e| {
            serde::de::Error::custom(format!("invalid label pattern '{pattern}': {e}"))
        })
    }
}

/// Kind of threshold comparison that fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    GreaterThan,
    LessThan,
    Equals,
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparison::GreaterThan => write!(f, "is greater than"),
            Comparison::LessThan => write!(f, "is less than"),
            Comparison::Equals => write!(f, "equals"),
        }
    }
}

/// A firing condition for one sample
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub metric: String,
    pub value: f64,
    pub comparison: Comparison,
    pub threshold: f64,
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} is {}, which {} {}",
            self.metric, self.value, self.comparison, self.threshold
        )
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rule {
    #[serde(default)]
    pub label_match: Option<HashMap<String, LabelPattern>>,
    #[serde(default)]
    pub gt: Option<f64>,
    #[serde(default)]
    pub lt: Option<f64>,
    #[serde(default)]
    pub eq: Option<f64>,
}

impl Rule {
    pub fn greater_than(threshold: f64) -> Self {
        Self {
            gt: Some(threshold),
            ..Self::default()
        }
    }

    pub fn less_than(threshold: f64) -> Self {
        Self {
            lt: Some(threshold),
            ..Self::default()
        }
    }

    pub fn equals(threshold: f64) -> Self {
        Self {
            eq: Some(threshold),
            ..Self::default()
        }
    }

    /// Restrict the rule to samples whose `label` starts with a match of `pattern`.
    pub fn with_label_match(mut self, label: impl ToString, pattern: LabelPattern) -> Self {
        self.label_match
            .get_or_insert_with(HashMap::new)
            .insert(label.to_string(), pattern);
        self
    }

    /// Whether any threshold is configured. Rules without one never fire.
    pub fn has_threshold(&self) -> bool {
        self.gt.is_some() || self.lt.is_some() || self.eq.is_some()
    }

    fn labels_match(&self, sample: &MetricSample) -> bool {
        let Some(label_match) = &self.label_match else {
            return true;
        };

        label_match.iter().all(|(label, pattern)| {
            sample
                .label(label)
                .is_some_and(|value| pattern.matches(value))
        })
    }

    /// Evaluate the rule for one sample.
    pub fn evaluate(&self, sample: &MetricSample) -> Option<Alert> {
        if !self.labels_match(sample) {
            return None;
        }

        let value = sample.value;
        let fired = [
            (Comparison::GreaterThan, self.gt.filter(|gt| value > *gt)),
            (Comparison::LessThan, self.lt.filter(|lt| value < *lt)),
            (Comparison::Equals, self.eq.filter(|eq| value == *eq)),
        ]
        .into_iter()
        .find_map(|(comparison, threshold)| threshold.map(|threshold| (comparison, threshold)));

        fired.map(|(comparison, threshold)| Alert {
            metric: sample.name.clone(),
            value,
            comparison,
            threshold,
        })
    }
}

/// Rules keyed by metric name
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct RuleSet(HashMap<String, Rule>);

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, metric: impl ToString, rule: Rule) -> Option<Rule> {
        self.0.insert(metric.to_string(), rule)
    }

    pub fn get(&self, metric: &str) -> Option<&Rule> {
        self.0.get(metric)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Rule)> {
        self.0.iter()
    }

    /// Evaluate every sample that has a rule, keeping alerts in sample order.
    pub fn evaluate_batch<'a>(
        &self,
        samples: impl IntoIterator<Item = &'a MetricSample>,
    ) -> Vec<Alert> {
        samples
            .into_iter()
            .filter_map(|sample| self.get(&sample.name)?.evaluate(sample))
            .collect()
    }
}

impl FromIterator<(String, Rule)> for RuleSet {
    fn from_iter<T: IntoIterator<Item = (String, Rule)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
