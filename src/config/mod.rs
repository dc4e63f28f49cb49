//! Process-wide settings, loaded once at start-up and passed explicitly to the
//! feed client and the metrics sink.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

const DEFAULT_FEED_BASE_URL: &str = "https://api.dexscreener.com/latest/dex";
const INFLUX_ENV_VARS: [&str; 4] = [
    "INFLUXDB_URL",
    "INFLUXDB_TOKEN",
    "INFLUXDB_ORG",
    "INFLUXDB_BUCKET",
];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Upstream market data feed
    #[serde(default)]
    pub feed: FeedConfig,
    /// Time-series metrics sink; `None` disables persistence
    #[serde(default)]
    pub influx: Option<InfluxConfig>,
    /// tracing-subscriber filter directive
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// `INFLUXDB_*` variables found unset while resolving `influx`.
    /// Reported once logging is up.
    #[serde(skip)]
    pub missing_influx_vars: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// DexScreener allows 300 token lookups per minute
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_minute: u32,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InfluxConfig {
    pub url: String,
    pub token: String,
    pub org: String,
    pub bucket: String,
}

fn default_base_url() -> String {
    DEFAULT_FEED_BASE_URL.to_string()
}

fn default_rate_limit() -> u32 {
    300
}

fn default_max_retries() -> u32 {
    3
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_log_filter() -> String {
    "dexsignal=info".to_string()
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            rate_limit_per_minute: default_rate_limit(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            feed: FeedConfig::default(),
            influx: None,
            log_filter: default_log_filter(),
            missing_influx_vars: Vec::new(),
        }
    }
}

impl InfluxConfig {
    /// Read the classic `INFLUXDB_*` variables.
    ///
    /// Returns the names of the missing variables when any is unset.
    pub fn from_env() -> std::result::Result<Self, Vec<&'static str>> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> std::result::Result<Self, Vec<&'static str>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let values: Vec<Option<String>> = INFLUX_ENV_VARS
            .iter()
            .map(|key| lookup(key).filter(|v| !v.is_empty()))
            .collect();

        let missing: Vec<&'static str> = INFLUX_ENV_VARS
            .iter()
            .zip(&values)
            .filter(|(_, v)| v.is_none())
            .map(|(key, _)| *key)
            .collect();

        if !missing.is_empty() {
            return Err(missing);
        }

        let mut values = values.into_iter().flatten();
        Ok(Self {
            url: values.next().unwrap_or_default(),
            token: values.next().unwrap_or_default(),
            org: values.next().unwrap_or_default(),
            bucket: values.next().unwrap_or_default(),
        })
    }
}

impl AppConfig {
    /// Load configuration from `.env`, an optional `config` file and
    /// `DEXSIGNAL__*` environment variables.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let settings = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("DEXSIGNAL").separator("__"))
            .build()
            .map_err(|e| Error::Config(format!("failed to build configuration: {}", e)))?;

        let mut app: AppConfig = settings
            .try_deserialize()
            .map_err(|e| Error::Config(format!("failed to deserialize configuration: {}", e)))?;

        app.resolve_influx(|key| std::env::var(key).ok());
        app.validate()?;
        Ok(app)
    }

    /// Fall back to the `INFLUXDB_*` variables when no sink is configured,
    /// remembering which ones were missing.
    fn resolve_influx<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.influx.is_some() {
            return;
        }
        match InfluxConfig::from_lookup(lookup) {
            Ok(influx) => self.influx = Some(influx),
            Err(missing) => self.missing_influx_vars = missing,
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.feed.base_url.trim().is_empty() {
            return Err(Error::Config("feed.base_url must not be empty".into()));
        }
        if self.feed.rate_limit_per_minute == 0 {
            return Err(Error::Config(
                "feed.rate_limit_per_minute must be greater than 0".into(),
            ));
        }
        if let Some(influx) = &self.influx {
            if influx.url.trim().is_empty() || influx.bucket.trim().is_empty() {
                return Err(Error::Config("influx.url and influx.bucket are required".into()));
            }
        }
        Ok(())
    }
}
