//! Configuration management for the fetch layer
//!
//! This module handles loading, validation, and environment overrides for
//! every component configuration.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::utils::error::{FetchError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use tracing::{debug, info};

/// Main configuration struct for the fetch layer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Upstream client configuration
    #[serde(default)]
    pub upstream: UpstreamConfig,
    /// Request coalescer configuration
    #[serde(default)]
    pub coalescer: CoalescerConfig,
    /// Cache warmer configuration
    #[serde(default)]
    pub warmer: WarmerConfig,
    /// Performance monitor configuration
    #[serde(default)]
    pub monitoring: MonitoringConfig,
    /// In-memory cache adapter configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file, then apply environment overrides
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| FetchError::Config(format!("Failed to read config file: {}", e)))?;

        let mut config: Config = serde_yaml::from_str(&content)
            .map_err(|e| FetchError::Config(format!("Failed to parse config: {}", e)))?;

        config.apply_env_overrides()?;
        config.validate()?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Load configuration from environment variables on top of defaults
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let mut config = Self::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `CATALOG_*` environment variables
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(base_url) = env::var("CATALOG_BASE_URL") {
            self.upstream.base_url = base_url;
        }
        if let Some(timeout) = parse_env::<u64>("CATALOG_TIMEOUT_MS")? {
            self.upstream.timeout_ms = timeout;
        }
        if let Some(retries) = parse_env::<u32>("CATALOG_MAX_RETRIES")? {
            self.upstream.max_retries = retries;
        }
        if let Some(delay) = parse_env::<u64>("CATALOG_RETRY_DELAY_MS")? {
            self.upstream.retry_delay_ms = delay;
        }
        if let Ok(user_agent) = env::var("CATALOG_USER_AGENT") {
            self.upstream.user_agent = user_agent;
        }
        if let Some(tracing) = parse_env::<bool>("CATALOG_ENABLE_TRACING")? {
            self.upstream.enable_tracing = tracing;
        }
        if let Some(enabled) = parse_env::<bool>("CATALOG_WARMER_ENABLED")? {
            self.warmer.enabled = enabled;
        }
        if let Ok(level) = env::var("CATALOG_LOG_LEVEL") {
            self.logging.level = level;
        }
        Ok(())
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        self.upstream
            .validate()
            .map_err(|e| FetchError::Config(format!("Upstream config error: {}", e)))?;
        self.coalescer
            .validate()
            .map_err(|e| FetchError::Config(format!("Coalescer config error: {}", e)))?;
        self.warmer
            .validate()
            .map_err(|e| FetchError::Config(format!("Warmer config error: {}", e)))?;
        self.monitoring
            .validate()
            .map_err(|e| FetchError::Config(format!("Monitoring config error: {}", e)))?;
        self.cache
            .validate()
            .map_err(|e| FetchError::Config(format!("Cache config error: {}", e)))?;
        self.logging
            .validate()
            .map_err(|e| FetchError::Config(format!("Logging config error: {}", e)))?;

        debug!("Configuration validation completed");
        Ok(())
    }

    /// Merge another configuration into this one. Upstream and warmer
    /// settings merge field by field; the other sections are replaced.
    pub fn merge(mut self, other: Self) -> Self {
        self.upstream = self.upstream.merge(other.upstream);
        self.warmer = self.warmer.merge(other.warmer);
        self.coalescer = other.coalescer;
        self.monitoring = other.monitoring;
        self.cache = other.cache;
        self.logging = other.logging;
        self
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| FetchError::Config(format!("Failed to serialize config to YAML: {}", e)))
    }
}

fn parse_env<T>(name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| FetchError::Config(format!("Invalid {}: {}", name, e))),
        Err(_) => Ok(None),
    }
}
