//! Configuration data models
//!
//! This module defines all configuration structures used throughout the fetch layer.

#![allow(missing_docs)]

pub mod cache;
pub mod coalescer;
pub mod logging;
pub mod monitoring;
pub mod upstream;
pub mod warmer;

// Re-export all configuration types
pub use cache::*;
pub use coalescer::*;
pub use logging::*;
pub use monitoring::*;
pub use upstream::*;
pub use warmer::*;

/// Public catalog endpoint used when none is configured
pub fn default_base_url() -> String {
    "https://git.door43.org/api/v1".to_string()
}

/// Default upstream timeout in milliseconds
pub fn default_timeout_ms() -> u64 {
    30_000
}

/// Default maximum retry attempts
pub fn default_max_retries() -> u32 {
    3
}

/// Default base retry delay in milliseconds, doubled per attempt
pub fn default_retry_delay_ms() -> u64 {
    1_000
}

pub fn default_user_agent() -> String {
    format!("catalog-fetch-rs/{}", env!("CARGO_PKG_VERSION"))
}

pub fn default_max_concurrent_keys() -> usize {
    1_000
}

pub fn default_coalescing_window_ms() -> u64 {
    10
}

pub fn default_cleanup_interval_ms() -> u64 {
    5_000
}

pub fn default_check_interval_secs() -> u64 {
    60
}

pub fn default_top_patterns() -> usize {
    20
}

pub fn default_pattern_window_hours() -> f64 {
    24.0
}

pub fn default_max_metrics() -> usize {
    10_000
}

pub fn default_response_time_threshold_ms() -> f64 {
    2_000.0
}

pub fn default_error_rate_threshold_pct() -> f64 {
    5.0
}

pub fn default_slow_endpoint_threshold_ms() -> f64 {
    3_000.0
}

pub fn default_alert_window() -> usize {
    100
}

pub fn default_min_alert_samples() -> usize {
    10
}

pub fn default_cache_ttl_secs() -> u64 {
    3_600 // 1 hour
}

pub fn default_cache_max_entries() -> u64 {
    10_000
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_true() -> bool {
    true
}
