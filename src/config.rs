use crate::dto::Session;
use crate::retry::RetryConfig;
use anyhow::{bail, Context, Result};
use reqwest::Url;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub catalog_url: String,
    pub wager_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub multiplier: f64,
    pub jitter: bool,
}

impl Default for RetrySettings {
    fn default() -> Self {
        let defaults = RetryConfig::default();
        Self {
            max_attempts: defaults.max_attempts,
            initial_delay_ms: defaults.initial_delay.as_millis() as u64,
            max_delay_ms: defaults.max_delay.as_millis() as u64,
            multiplier: defaults.multiplier,
            jitter: defaults.jitter,
        }
    }
}

impl From<&RetrySettings> for RetryConfig {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts,
            initial_delay: Duration::from_millis(settings.initial_delay_ms),
            max_delay: Duration::from_millis(settings.max_delay_ms),
            multiplier: settings.multiplier,
            jitter: settings.jitter,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub retry: RetrySettings,
    pub session: Option<Session>,
}

impl Config {
    /// Load `config.toml` from the working directory.
    pub fn new() -> Result<Self> {
        Self::from_path(DEFAULT_CONFIG_PATH)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config_str = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml_str(&config_str)
    }

    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(config_str)?;
        config.validate()?;
        debug!(
            "Config: catalog={} wager={} timeout={}s",
            config.api.catalog_url, config.api.wager_url, config.api.timeout_secs
        );
        Ok(config)
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::from(&self.retry)
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("api.catalog_url", &self.api.catalog_url),
            ("api.wager_url", &self.api.wager_url),
        ] {
            let url = Url::parse(value).with_context(|| format!("{name} is not a valid URL"))?;
            if !matches!(url.scheme(), "http" | "https") {
                bail!("{name} must use http or https, got '{}'", url.scheme());
            }
        }

        if self.retry.multiplier < 1.0 {
            bail!("retry.multiplier must be at least 1.0");
        }

        if let Some(session) = &self.session {
            if session.user_id.trim().is_empty() {
                bail!("session.user_id must not be empty");
            }
        }

        Ok(())
    }
}
