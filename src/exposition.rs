//! Line parser for the text exposition format
//!
//! Only plain samples are understood:
//!
//! ```text
//! # HELP node_load1 1m load average.
//! # TYPE node_load1 gauge
//! node_load1 0.42
//! node_cpu_seconds_total{cpu="0",mode="idle"} 95.2
//! ```
//!
//! Every line is classified as either a sample or not a sample. Comments,
//! blank lines and anything malformed end up as [`ParsedLine::NotASample`];
//! the parser never fails and never panics, so one bad line can not break a
//! whole scrape.
//!
//! The name and the value have to be separated by exactly one space. Lines
//! with several consecutive spaces (or a trailing timestamp) are rejected.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use crate::MetricSample;

static LABEL_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(\w+)="([^"]*)""#).expect("label pattern is valid"));

/// Outcome of parsing a single line
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedLine {
    Sample(MetricSample),
    NotASample,
}

impl ParsedLine {
    pub fn is_sample(&self) -> bool {
        matches!(self, ParsedLine::Sample(_))
    }

    pub fn into_sample(self) -> Option<MetricSample> {
        match self {
            ParsedLine::Sample(sample) => Some(sample),
            ParsedLine::NotASample => None,
        }
    }
}

impl From<Option<MetricSample>> for ParsedLine {
    fn from(sample: Option<MetricSample>) -> Self {
        sample.map_or(ParsedLine::NotASample, ParsedLine::Sample)
    }
}

/// Parse one line of a scrape body.
pub fn parse_line(line: &str) -> ParsedLine {
    let trimmed = line.trim_start();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return ParsedLine::NotASample;
    }

    parse_sample(line).into()
}

/// Parse a whole scrape body, keeping the samples in input order.
pub fn parse_samples(body: &str) -> Vec<MetricSample> {
    let samples = body
        .lines()
        .filter_map(|line| parse_line(line).into_sample())
        .collect::<Vec<_>>();

    trace!("parsed {} samples", samples.len());

    samples
}

fn parse_sample(line: &str) -> Option<MetricSample> {
    let mut fields = line.split(' ');
    let (Some(series), Some(value), None) = (fields.next(), fields.next(), fields.next()) else {
        return None;
    };

    let value = value.trim().parse::<f64>().ok()?;
    let (name, labels) = parse_series(series)?;

    if name.is_empty() {
        return None;
    }

    Some(MetricSample {
        name: name.to_string(),
        value,
        labels,
    })
}

/// Split `name{label="value",...}` into the metric name and its labels.
fn parse_series(series: &str) -> Option<(&str, HashMap<String, String>)> {
    let Some(open) = series.find('{') else {
        return Some((series, HashMap::new()));
    };

    let close = series.rfind('}')?;
    let body = series.get(open + 1..close).unwrap_or_default();

    let labels = LABEL_PAIR
        .captures_iter(body)
        .map(|pair| (pair[1].to_string(), pair[2].to_string()))
        .collect();

    Some((&series[..open], labels))
}
