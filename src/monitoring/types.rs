//! Type definitions for metrics, statistics and alerts

use crate::core::resource::{ResourceKey, ResourceKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a caller reports after one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestSample {
    pub endpoint: String,
    /// Canonical resource key, when the request was for a known resource
    pub resource: Option<String>,
    pub kind: Option<ResourceKind>,
    pub method: String,
    pub response_time_ms: f64,
    pub status_code: u16,
    pub content_size: usize,
    pub cache_hit: bool,
    pub compressed: bool,
    /// Defaults to the time of recording
    pub timestamp: Option<DateTime<Utc>>,
}

impl RequestSample {
    pub fn new<S: Into<String>>(endpoint: S, response_time_ms: f64, status_code: u16) -> Self {
        Self {
            endpoint: endpoint.into(),
            resource: None,
            kind: None,
            method: "GET".to_string(),
            response_time_ms,
            status_code,
            content_size: 0,
            cache_hit: false,
            compressed: false,
            timestamp: None,
        }
    }

    pub fn with_resource(mut self, key: &ResourceKey) -> Self {
        self.resource = Some(key.canonical());
        self.kind = Some(key.kind);
        self
    }

    pub fn with_method<S: Into<String>>(mut self, method: S) -> Self {
        self.method = method.into();
        self
    }

    pub fn with_cache_hit(mut self, cache_hit: bool) -> Self {
        self.cache_hit = cache_hit;
        self
    }

    pub fn with_compressed(mut self, compressed: bool) -> Self {
        self.compressed = compressed;
        self
    }

    pub fn with_content_size(mut self, content_size: usize) -> Self {
        self.content_size = content_size;
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// A recorded sample with its endpoint normalized
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestMetric {
    /// Normalized endpoint used for grouping
    pub endpoint: String,
    pub resource: Option<String>,
    pub kind: Option<ResourceKind>,
    pub method: String,
    pub timestamp: DateTime<Utc>,
    pub response_time_ms: f64,
    pub status_code: u16,
    pub content_size: usize,
    pub cache_hit: bool,
    pub compressed: bool,
}

impl RequestMetric {
    pub fn is_error(&self) -> bool {
        self.status_code >= 400
    }
}

/// Average latency of one normalized endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointStat {
    pub endpoint: String,
    pub average_ms: f64,
    pub count: usize,
}

/// Statistics over a time window
#[derive(Debug, Clone, Default, Serialize)]
pub struct PerformanceStats {
    pub window_hours: f64,
    pub total_requests: usize,
    pub average_response_time_ms: f64,
    pub median_response_time_ms: f64,
    pub p95_response_time_ms: f64,
    pub p99_response_time_ms: f64,
    /// Percentage of samples with status >= 400
    pub error_rate: f64,
    pub cache_hit_rate: f64,
    pub compression_rate: f64,
    pub total_bytes: usize,
    pub slowest_endpoints: Vec<EndpointStat>,
    pub fastest_endpoints: Vec<EndpointStat>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BottleneckKind {
    HighLatency,
    HighErrorRate,
    LowCacheHitRate,
    LowCompressionRate,
    SlowEndpoint,
}

/// Ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bottleneck {
    pub kind: BottleneckKind,
    pub impact: Impact,
    pub description: String,
    pub value: f64,
    pub threshold: f64,
    pub endpoint: Option<String>,
}

/// Stats, bottlenecks and recommendations for one window
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceInsights {
    pub stats: PerformanceStats,
    pub bottlenecks: Vec<Bottleneck>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Warning,
    Critical,
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertSeverity::Warning => write!(f, "WARNING"),
            AlertSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    ResponseTime,
    ErrorRate,
}

#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    pub id: String,
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    pub message: String,
    pub value: f64,
    pub threshold: f64,
    pub endpoint: Option<String>,
    pub timestamp: DateTime<Utc>,
}
