//! Performance monitor implementation

use super::alerts::{self, AlertCallback, MAX_ALERT_HISTORY};
use super::bottlenecks;
use super::normalize::normalize_endpoint;
use super::stats;
use super::types::{Alert, PerformanceInsights, PerformanceStats, RequestMetric, RequestSample};
use crate::config::MonitoringConfig;
use crate::core::traits::MetricSink;
use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::fmt;
use tracing::{debug, warn};

/// Window used by `get_insights`
const INSIGHTS_WINDOW_HOURS: f64 = 24.0;

/// Bounded metric buffer with derived statistics and alerting
pub struct PerformanceMonitor {
    config: MonitoringConfig,
    metrics: RwLock<VecDeque<RequestMetric>>,
    alert_history: Mutex<VecDeque<Alert>>,
    alert_callback: RwLock<Option<AlertCallback>>,
}

impl fmt::Debug for PerformanceMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PerformanceMonitor")
            .field("config", &self.config)
            .field("metrics", &self.metrics.read().len())
            .field("alerts", &self.alert_history.lock().len())
            .finish_non_exhaustive()
    }
}

impl PerformanceMonitor {
    pub fn new(config: MonitoringConfig) -> Self {
        Self {
            metrics: RwLock::new(VecDeque::with_capacity(config.max_metrics.min(1_024))),
            alert_history: Mutex::new(VecDeque::new()),
            alert_callback: RwLock::new(None),
            config,
        }
    }

    pub fn config(&self) -> &MonitoringConfig {
        &self.config
    }

    pub fn set_alert_callback(&self, callback: AlertCallback) {
        *self.alert_callback.write() = Some(callback);
    }

    /// Record one sample and evaluate alerts against it
    pub fn record_metrics(&self, sample: RequestSample) {
        let metric = RequestMetric {
            endpoint: normalize_endpoint(&sample.endpoint),
            resource: sample.resource,
            kind: sample.kind,
            method: sample.method,
            timestamp: sample.timestamp.unwrap_or_else(Utc::now),
            response_time_ms: sample.response_time_ms,
            status_code: sample.status_code,
            content_size: sample.content_size,
            cache_hit: sample.cache_hit,
            compressed: sample.compressed,
        };

        let raised = {
            let mut metrics = self.metrics.write();
            metrics.push_back(metric);
            if metrics.len() > self.config.max_metrics {
                let excess = (self.config.max_metrics / 10).max(1);
                let excess = excess.min(metrics.len());
                metrics.drain(..excess);
                debug!("Trimmed {} oldest metrics", excess);
            }
            match metrics.back() {
                Some(latest) => alerts::evaluate(latest, &metrics, &self.config),
                None => Vec::new(),
            }
        };

        for alert in raised {
            self.raise(alert);
        }
    }

    fn raise(&self, alert: Alert) {
        let callback = self.alert_callback.read().clone();
        match callback {
            Some(callback) => callback(&alert),
            None => warn!(
                severity = %alert.severity,
                value = alert.value,
                threshold = alert.threshold,
                "{}",
                alert.message
            ),
        }

        let mut history = self.alert_history.lock();
        if history.len() >= MAX_ALERT_HISTORY {
            history.pop_front();
        }
        history.push_back(alert);
    }

    /// Metrics recorded within the last `window_hours`
    ///
    /// A negative or NaN window selects nothing. A window too large to
    /// represent selects everything still buffered.
    pub fn recent_metrics(&self, window_hours: f64) -> Vec<RequestMetric> {
        if window_hours.is_nan() || window_hours < 0.0 {
            return Vec::new();
        }
        let cutoff = window_cutoff(Utc::now(), window_hours);
        self.metrics
            .read()
            .iter()
            .filter(|m| cutoff.is_none_or(|cutoff| m.timestamp >= cutoff))
            .cloned()
            .collect()
    }

    pub fn metric_count(&self) -> usize {
        self.metrics.read().len()
    }

    pub fn get_stats(&self, window_hours: f64) -> PerformanceStats {
        stats::compute(&self.recent_metrics(window_hours), window_hours)
    }

    pub fn get_insights(&self) -> PerformanceInsights {
        let metrics = self.recent_metrics(INSIGHTS_WINDOW_HOURS);
        let stats = stats::compute(&metrics, INSIGHTS_WINDOW_HOURS);
        let bottlenecks = bottlenecks::detect(&stats, &metrics, &self.config);
        let recommendations = bottlenecks::recommendations(&bottlenecks);
        PerformanceInsights {
            stats,
            bottlenecks,
            recommendations,
        }
    }

    /// Most recent alerts, newest last
    pub fn alert_history(&self, limit: usize) -> Vec<Alert> {
        let history = self.alert_history.lock();
        let skip = history.len().saturating_sub(limit);
        history.iter().skip(skip).cloned().collect()
    }

    pub fn reset(&self) {
        self.metrics.write().clear();
        self.alert_history.lock().clear();
    }
}

impl MetricSink for PerformanceMonitor {
    fn record(&self, sample: RequestSample) {
        self.record_metrics(sample);
    }
}
/// `None` when the window reaches past the representable time range
fn window_cutoff(now: DateTime<Utc>, window_hours: f64) -> Option<DateTime<Utc>> {
    let millis = window_hours * 3_600_000.0;
    if !millis.is_finite() || millis >= i64::MAX as f64 {
        return None;
    }
    TimeDelta::try_milliseconds(millis as i64).and_then(|window| now.checked_sub_signed(window))
}

