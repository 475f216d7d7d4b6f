//! Statistics over a slice of metrics

use super::types::{EndpointStat, PerformanceStats, RequestMetric};
use std::collections::HashMap;

/// Endpoints need this many samples to be ranked
pub(super) const MIN_ENDPOINT_SAMPLES: usize = 5;

/// Ranked endpoints reported on each side
const RANKED_ENDPOINTS: usize = 5;

/// Value at sorted index `floor(p * n)`, clamped to the last element
pub(super) fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let index = ((p * sorted.len() as f64).floor() as usize).min(sorted.len() - 1);
    sorted[index]
}

fn rate(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// Average latency per endpoint, restricted to endpoints with enough samples
pub(super) fn endpoint_averages(metrics: &[RequestMetric]) -> Vec<EndpointStat> {
    let mut grouped: HashMap<&str, (f64, usize)> = HashMap::new();
    for metric in metrics {
        let entry = grouped.entry(metric.endpoint.as_str()).or_insert((0.0, 0));
        entry.0 += metric.response_time_ms;
        entry.1 += 1;
    }

    grouped
        .into_iter()
        .filter(|(_, (_, count))| *count >= MIN_ENDPOINT_SAMPLES)
        .map(|(endpoint, (sum, count))| EndpointStat {
            endpoint: endpoint.to_string(),
            average_ms: sum / count as f64,
            count,
        })
        .collect()
}

pub(super) fn compute(metrics: &[RequestMetric], window_hours: f64) -> PerformanceStats {
    let total = metrics.len();
    if total == 0 {
        return PerformanceStats {
            window_hours,
            ..PerformanceStats::default()
        };
    }

    let mut times: Vec<f64> = metrics.iter().map(|m| m.response_time_ms).collect();
    times.sort_by(|a, b| a.total_cmp(b));
    let average = times.iter().sum::<f64>() / total as f64;

    let errors = metrics.iter().filter(|m| m.is_error()).count();
    let hits = metrics.iter().filter(|m| m.cache_hit).count();
    let compressed = metrics.iter().filter(|m| m.compressed).count();

    let mut by_endpoint = endpoint_averages(metrics);
    by_endpoint.sort_by(|a, b| {
        b.average_ms
            .total_cmp(&a.average_ms)
            .then_with(|| a.endpoint.cmp(&b.endpoint))
    });
    let slowest_endpoints = by_endpoint.iter().take(RANKED_ENDPOINTS).cloned().collect();
    let fastest_endpoints = by_endpoint.iter().rev().take(RANKED_ENDPOINTS).cloned().collect();

    PerformanceStats {
        window_hours,
        total_requests: total,
        average_response_time_ms: average,
        median_response_time_ms: percentile(&times, 0.5),
        p95_response_time_ms: percentile(&times, 0.95),
        p99_response_time_ms: percentile(&times, 0.99),
        error_rate: rate(errors, total),
        cache_hit_rate: rate(hits, total),
        compression_rate: rate(compressed, total),
        total_bytes: metrics.iter().map(|m| m.content_size).sum(),
        slowest_endpoints,
        fastest_endpoints,
    }
}
