use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{trace, warn};

use crate::rules::RuleSet;

/// Scrape target exposing `/metrics`
#[derive(Debug, Clone, serde::Deserialize)]
pub struct TargetConfig {
    pub host: String,
    #[serde(default = "crate::util::get_default_exporter_port")]
    pub port: u16,
}

impl TargetConfig {
    pub fn url(&self) -> String {
        format!("http://{}:{}/metrics", self.host, self.port)
    }

    pub fn id(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub node_exporter: TargetConfig,

    /// Seconds between two scrapes
    #[serde(default = "crate::util::get_default_check_interval")]
    pub check_interval: u64,

    #[serde(default)]
    pub rules: RuleSet,

    pub email: Option<EmailConfig>,

    pub webhook: Option<WebhookConfig>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct EmailConfig {
    pub from: String,
    pub to: String,
    pub smtp_server: String,
    #[serde(default = "crate::util::get_default_smtp_port")]
    pub smtp_port: u16,
    /// Upgrade the connection with STARTTLS
    #[serde(default = "crate::util::get_default_use_tls")]
    pub use_tls: bool,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl EmailConfig {
    /// Configured password, falling back to the `SMTP_PASSWORD` environment variable.
    pub fn resolved_password(&self) -> Option<String> {
        self.password
            .clone()
            .or_else(crate::util::get_smtp_password)
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct WebhookConfig {
    pub url: String,
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct LoggingConfig {
    /// Additional log file; logs always go to stderr
    pub file: Option<PathBuf>,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.node_exporter.host.trim().is_empty() {
            anyhow::bail!("node_exporter.host must not be empty");
        }

        if self.check_interval == 0 {
            anyhow::bail!("check_interval must be > 0");
        }

        for (metric, rule) in self.rules.iter() {
            if !rule.has_threshold() {
                warn!("rule for {metric} has no gt, lt or eq threshold and will never fire");
            }
        }

        Ok(())
    }
}

/// Parse a configuration from YAML.
pub fn parse_config(content: &str) -> anyhow::Result<Config> {
    let config: Config = serde_yaml::from_str(content).context("invalid YAML configuration")?;
    config.validate()?;
    Ok(config)
}

/// Read a configuration file. Files ending in `.json` are parsed as JSON,
/// everything else as YAML.
pub fn read_config_file(path: impl AsRef<Path>) -> anyhow::Result<Config> {
    let path = path.as_ref();
    let file_content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;

    let is_json = path
        .extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case("json"));

    let config = if is_json {
        let config: Config =
            serde_json::from_str(&file_content).context("invalid JSON configuration")?;
        config.validate()?;
        config
    } else {
        parse_config(&file_content)?
    };

    trace!("loaded config: {config:?}");

    Ok(config)
}
