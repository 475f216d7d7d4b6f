//! Alert evaluation

use super::types::{Alert, AlertKind, AlertSeverity, RequestMetric};
use crate::config::MonitoringConfig;
use chrono::Utc;
use std::collections::VecDeque;
use std::sync::Arc;

/// Receives every raised alert instead of the default `warn!` log
pub type AlertCallback = Arc<dyn Fn(&Alert) + Send + Sync>;

/// Alerts kept in history
pub(super) const MAX_ALERT_HISTORY: usize = 1_000;

fn severity(value: f64, threshold: f64) -> AlertSeverity {
    if value >= threshold * 2.0 {
        AlertSeverity::Critical
    } else {
        AlertSeverity::Warning
    }
}

/// Alerts raised by the newest metric, given the buffer it was appended to
pub(super) fn evaluate(
    latest: &RequestMetric,
    buffer: &VecDeque<RequestMetric>,
    config: &MonitoringConfig,
) -> Vec<Alert> {
    let mut alerts = Vec::new();

    let threshold = config.response_time_threshold_ms;
    if latest.response_time_ms > threshold {
        alerts.push(Alert {
            id: uuid::Uuid::new_v4().to_string(),
            kind: AlertKind::ResponseTime,
            severity: severity(latest.response_time_ms, threshold),
            message: format!(
                "{} took {:.0}ms (threshold {:.0}ms)",
                latest.endpoint, latest.response_time_ms, threshold
            ),
            value: latest.response_time_ms,
            threshold,
            endpoint: Some(latest.endpoint.clone()),
            timestamp: Utc::now(),
        });
    }

    let window = buffer.len().min(config.alert_window);
    if window >= config.min_alert_samples && window > 0 {
        let errors = buffer.iter().rev().take(window).filter(|m| m.is_error()).count();
        let error_rate = errors as f64 / window as f64 * 100.0;
        let threshold = config.error_rate_threshold_pct;
        if error_rate > threshold {
            alerts.push(Alert {
                id: uuid::Uuid::new_v4().to_string(),
                kind: AlertKind::ErrorRate,
                severity: severity(error_rate, threshold),
                message: format!(
                    "Error rate {:.1}% over the last {} requests (threshold {:.1}%)",
                    error_rate, window, threshold
                ),
                value: error_rate,
                threshold,
                endpoint: None,
                timestamp: Utc::now(),
            });
        }
    }

    alerts
}
