//! Upstream catalog client configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Upstream client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Catalog API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-call timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base backoff delay in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// User-Agent header value
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Record a `CallTrace` for every attempt
    #[serde(default)]
    pub enable_tracing: bool,
    /// Add +/-5% jitter to backoff delays
    #[serde(default)]
    pub jitter: bool,
    /// Extra headers sent with every request
    #[serde(default)]
    pub default_headers: HashMap<String, String>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            user_agent: default_user_agent(),
            enable_tracing: false,
            jitter: false,
            default_headers: HashMap::new(),
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl UpstreamConfig {
    /// Merge upstream configurations; values left at their defaults in
    /// `other` do not override `self`
    pub fn merge(mut self, other: Self) -> Self {
        if other.base_url != default_base_url() {
            self.base_url = other.base_url;
        }
        if other.timeout_ms != default_timeout_ms() {
            self.timeout_ms = other.timeout_ms;
        }
        if other.max_retries != default_max_retries() {
            self.max_retries = other.max_retries;
        }
        if other.retry_delay_ms != default_retry_delay_ms() {
            self.retry_delay_ms = other.retry_delay_ms;
        }
        if other.user_agent != default_user_agent() {
            self.user_agent = other.user_agent;
        }
        if other.enable_tracing {
            self.enable_tracing = true;
        }
        if other.jitter {
            self.jitter = true;
        }
        self.default_headers.extend(other.default_headers);
        self
    }
}
