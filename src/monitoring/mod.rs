//! Performance monitoring
//!
//! A bounded buffer of request metrics with statistics, bottleneck
//! detection and alerting derived on demand.

mod alerts;
mod bottlenecks;
mod monitor;
mod normalize;
mod stats;
mod types;

pub use alerts::AlertCallback;
pub use monitor::PerformanceMonitor;
pub use normalize::normalize_endpoint;
pub use types::{
    Alert, AlertKind, AlertSeverity, Bottleneck, BottleneckKind, EndpointStat, Impact,
    PerformanceInsights, PerformanceStats, RequestMetric, RequestSample,
};
