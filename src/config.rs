//! Runtime configuration loaded from an optional YAML file.
//!
//! Every field has a default, so a config file only needs to name the
//! knobs it changes:
//!
//! ```yaml
//! aggregator:
//!   max_concurrency: 8
//! cache:
//!   blacklist_ttl_secs: 60
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, instrument};

pub const DEFAULT_USER_AGENT: &str = concat!(
    "orbital_news/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/orbital-news/orbital_news)"
);

pub const DEEPL_FREE_ENDPOINT: &str = "https://api-free.deepl.com/v2";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub aggregator: AggregatorConfig,
    pub cache: CacheConfig,
    pub fetch: FetchConfig,
    pub translator: TranslatorConfig,
}

/// Fan-out and merge limits for a single aggregation call.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Simultaneous fetch pipelines per aggregation call.
    pub max_concurrency: usize,
    /// Articles kept from a single feed.
    pub per_feed_cap: usize,
    /// Articles returned by one aggregation call.
    pub global_cap: usize,
    /// Number of stampede lock shards.
    pub lock_shards: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            per_feed_cap: 5,
            global_cap: 10,
            lock_shards: 64,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    pub result_ttl_secs: u64,
    pub blacklist_ttl_secs: u64,
    pub translation_ttl_secs: u64,
    /// Capacity of each cache.
    pub max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            result_ttl_secs: 30 * 60,
            blacklist_ttl_secs: 5 * 60,
            translation_ttl_secs: 24 * 60 * 60,
            max_entries: 10_000,
        }
    }
}

impl CacheConfig {
    pub fn result_ttl(&self) -> Duration {
        Duration::from_secs(self.result_ttl_secs)
    }

    pub fn blacklist_ttl(&self) -> Duration {
        Duration::from_secs(self.blacklist_ttl_secs)
    }

    pub fn translation_ttl(&self) -> Duration {
        Duration::from_secs(self.translation_ttl_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TranslatorConfig {
    /// Base URL of the DeepL API (free and pro accounts use different hosts).
    pub endpoint: String,
    pub max_retries: usize,
    pub base_delay_ms: u64,
    pub timeout_secs: u64,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            endpoint: DEEPL_FREE_ENDPOINT.to_string(),
            max_retries: 3,
            base_delay_ms: 500,
            timeout_secs: 10,
        }
    }
}

impl TranslatorConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Load configuration from `path`, or return the defaults when no path is given.
#[instrument(level = "info")]
pub fn load_config(path: Option<&str>) -> Result<AppConfig, ConfigError> {
    let Some(path) = path else {
        info!("No config file given; using defaults");
        return Ok(AppConfig::default());
    };

    let raw = std::fs::read_to_string(path)?;
    let config = parse_config(&raw)?;
    info!(path, "Loaded configuration");
    Ok(config)
}

/// Parse a YAML document into an [`AppConfig`]. An empty document yields the defaults.
pub fn parse_config(raw: &str) -> Result<AppConfig, ConfigError> {
    if raw.trim().is_empty() {
        return Ok(AppConfig::default());
    }
    Ok(serde_yaml::from_str(raw)?)
}
