//! Bottleneck detection and recommendations

use super::stats::endpoint_averages;
use super::types::{Bottleneck, BottleneckKind, Impact, PerformanceStats, RequestMetric};
use crate::config::MonitoringConfig;

/// Cache hit and compression rates below this are flagged
const LOW_RATE_PCT: f64 = 50.0;

fn severity(value: f64, threshold: f64, base: Impact, escalated: Impact) -> Impact {
    if value >= threshold * 2.0 { escalated } else { base }
}

/// Detect bottlenecks, most severe first. Ties keep detection order.
pub(super) fn detect(
    stats: &PerformanceStats,
    metrics: &[RequestMetric],
    config: &MonitoringConfig,
) -> Vec<Bottleneck> {
    let mut found = Vec::new();
    if stats.total_requests == 0 {
        return found;
    }

    let latency_threshold = config.response_time_threshold_ms;
    if stats.average_response_time_ms > latency_threshold {
        found.push(Bottleneck {
            kind: BottleneckKind::HighLatency,
            impact: severity(
                stats.average_response_time_ms,
                latency_threshold,
                Impact::High,
                Impact::Critical,
            ),
            description: format!(
                "Average response time {:.0}ms exceeds {:.0}ms",
                stats.average_response_time_ms, latency_threshold
            ),
            value: stats.average_response_time_ms,
            threshold: latency_threshold,
            endpoint: None,
        });
    }

    let error_threshold = config.error_rate_threshold_pct;
    if stats.error_rate > error_threshold {
        found.push(Bottleneck {
            kind: BottleneckKind::HighErrorRate,
            impact: severity(stats.error_rate, error_threshold, Impact::High, Impact::Critical),
            description: format!(
                "Error rate {:.1}% exceeds {:.1}%",
                stats.error_rate, error_threshold
            ),
            value: stats.error_rate,
            threshold: error_threshold,
            endpoint: None,
        });
    }

    if stats.cache_hit_rate < LOW_RATE_PCT {
        found.push(Bottleneck {
            kind: BottleneckKind::LowCacheHitRate,
            impact: Impact::Medium,
            description: format!("Cache hit rate is only {:.1}%", stats.cache_hit_rate),
            value: stats.cache_hit_rate,
            threshold: LOW_RATE_PCT,
            endpoint: None,
        });
    }

    if stats.compression_rate < LOW_RATE_PCT {
        found.push(Bottleneck {
            kind: BottleneckKind::LowCompressionRate,
            impact: Impact::Low,
            description: format!(
                "Only {:.1}% of responses were compressed",
                stats.compression_rate
            ),
            value: stats.compression_rate,
            threshold: LOW_RATE_PCT,
            endpoint: None,
        });
    }

    let slow_threshold = config.slow_endpoint_threshold_ms;
    let mut slow: Vec<_> = endpoint_averages(metrics)
        .into_iter()
        .filter(|e| e.average_ms > slow_threshold)
        .collect();
    slow.sort_by(|a, b| a.endpoint.cmp(&b.endpoint));
    for endpoint in slow {
        found.push(Bottleneck {
            kind: BottleneckKind::SlowEndpoint,
            impact: severity(endpoint.average_ms, slow_threshold, Impact::Medium, Impact::High),
            description: format!(
                "{} averages {:.0}ms over {} requests",
                endpoint.endpoint, endpoint.average_ms, endpoint.count
            ),
            value: endpoint.average_ms,
            threshold: slow_threshold,
            endpoint: Some(endpoint.endpoint),
        });
    }

    found.sort_by(|a, b| b.impact.cmp(&a.impact));
    found
}

pub(super) fn recommendations(bottlenecks: &[Bottleneck]) -> Vec<String> {
    let mut recommendations: Vec<String> = Vec::new();
    for bottleneck in bottlenecks {
        let advice = match bottleneck.kind {
            BottleneckKind::HighLatency => {
                "Warm frequently requested resources ahead of demand to cut average latency"
                    .to_string()
            }
            BottleneckKind::HighErrorRate => {
                "Investigate upstream failures; consider raising retries or the request timeout"
                    .to_string()
            }
            BottleneckKind::LowCacheHitRate => {
                "Increase cache TTL or add warming strategies for popular resources".to_string()
            }
            BottleneckKind::LowCompressionRate => {
                "Request compressed responses (Accept-Encoding) to reduce transfer size"
                    .to_string()
            }
            BottleneckKind::SlowEndpoint => format!(
                "Add {} to a warming strategy or cache it longer",
                bottleneck.endpoint.as_deref().unwrap_or("the slow endpoint")
            ),
        };
        if !recommendations.contains(&advice) {
            recommendations.push(advice);
        }
    }
    recommendations
}
