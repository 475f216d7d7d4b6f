//! Request coalescer configuration

use super::*;
use crate::core::coalescer::ErrorHandling;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Request coalescer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoalescerConfig {
    /// Ceiling on how long a pending entry may live, in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Maximum number of keys tracked at once
    #[serde(default = "default_max_concurrent_keys")]
    pub max_concurrent_keys: usize,
    /// How errors are handed to concurrent waiters
    #[serde(default)]
    pub error_handling: ErrorHandling,
    /// Delay before the fetch starts, letting near-simultaneous callers join
    #[serde(default = "default_coalescing_window_ms")]
    pub coalescing_window_ms: u64,
    /// Period of the stale-entry sweep
    #[serde(default = "default_cleanup_interval_ms")]
    pub cleanup_interval_ms: u64,
}

impl Default for CoalescerConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            max_concurrent_keys: default_max_concurrent_keys(),
            error_handling: ErrorHandling::default(),
            coalescing_window_ms: default_coalescing_window_ms(),
            cleanup_interval_ms: default_cleanup_interval_ms(),
        }
    }
}

impl CoalescerConfig {
    pub fn max_pending_time(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn coalescing_window(&self) -> Duration {
        Duration::from_millis(self.coalescing_window_ms)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_millis(self.cleanup_interval_ms)
    }
}
