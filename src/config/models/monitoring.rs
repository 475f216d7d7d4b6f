//! Performance monitor configuration

use super::*;
use serde::{Deserialize, Serialize};

/// Performance monitor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    /// Ring buffer capacity
    #[serde(default = "default_max_metrics")]
    pub max_metrics: usize,
    /// Per-request latency alert threshold
    #[serde(default = "default_response_time_threshold_ms")]
    pub response_time_threshold_ms: f64,
    /// Error rate alert threshold (percentage)
    #[serde(default = "default_error_rate_threshold_pct")]
    pub error_rate_threshold_pct: f64,
    /// Per-endpoint average latency ceiling
    #[serde(default = "default_slow_endpoint_threshold_ms")]
    pub slow_endpoint_threshold_ms: f64,
    /// Samples considered by the error-rate alert
    #[serde(default = "default_alert_window")]
    pub alert_window: usize,
    /// Samples required before the error-rate alert is evaluated
    #[serde(default = "default_min_alert_samples")]
    pub min_alert_samples: usize,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            max_metrics: default_max_metrics(),
            response_time_threshold_ms: default_response_time_threshold_ms(),
            error_rate_threshold_pct: default_error_rate_threshold_pct(),
            slow_endpoint_threshold_ms: default_slow_endpoint_threshold_ms(),
            alert_window: default_alert_window(),
            min_alert_samples: default_min_alert_samples(),
        }
    }
}
