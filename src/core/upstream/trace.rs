//! Per-call tracing

use super::cache_status::CacheStatus;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

/// Oldest calls are dropped beyond this
const MAX_TRACE_CALLS: usize = 1_000;

/// One attempt against the upstream
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallTrace {
    pub id: String,
    pub endpoint: String,
    pub url: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_ms: f64,
    pub status_code: Option<u16>,
    pub success: bool,
    pub cache_status: CacheStatus,
    /// 1-based attempt number within its request
    pub attempt: u32,
    pub error: Option<String>,
}

/// Calls recorded since the last `start_trace`/`clear_trace`, with aggregates
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trace {
    pub operation: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub calls: Vec<CallTrace>,
    pub total_duration_ms: f64,
    pub cache_hits: usize,
    pub cache_misses: usize,
    /// Percentage of calls with a determinable status that were hits
    pub hit_rate: f64,
    pub fastest_ms: Option<f64>,
    pub slowest_ms: Option<f64>,
    pub average_ms: f64,
}

impl Trace {
    fn from_calls(
        operation: Option<String>,
        started_at: Option<DateTime<Utc>>,
        calls: Vec<CallTrace>,
    ) -> Self {
        let total_duration_ms: f64 = calls.iter().map(|c| c.duration_ms).sum();
        let cache_hits = calls.iter().filter(|c| c.cache_status.is_hit()).count();
        let cache_misses = calls.iter().filter(|c| c.cache_status.is_miss()).count();
        let determinable = cache_hits + cache_misses;
        let hit_rate = if determinable > 0 {
            cache_hits as f64 / determinable as f64 * 100.0
        } else {
            0.0
        };
        let fastest_ms = calls.iter().map(|c| c.duration_ms).reduce(f64::min);
        let slowest_ms = calls.iter().map(|c| c.duration_ms).reduce(f64::max);
        let average_ms = if calls.is_empty() {
            0.0
        } else {
            total_duration_ms / calls.len() as f64
        };

        Self {
            operation,
            started_at,
            calls,
            total_duration_ms,
            cache_hits,
            cache_misses,
            hit_rate,
            fastest_ms,
            slowest_ms,
            average_ms,
        }
    }
}

#[derive(Debug, Default)]
struct TraceBuffer {
    operation: Option<String>,
    started_at: Option<DateTime<Utc>>,
    calls: VecDeque<CallTrace>,
}

#[derive(Debug)]
pub(super) struct TraceRecorder {
    enabled: AtomicBool,
    buffer: Mutex<TraceBuffer>,
}

impl TraceRecorder {
    pub(super) fn new(enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
            buffer: Mutex::new(TraceBuffer::default()),
        }
    }

    pub(super) fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub(super) fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub(super) fn record(&self, call: CallTrace) {
        let mut buffer = self.buffer.lock();
        if buffer.calls.len() >= MAX_TRACE_CALLS {
            buffer.calls.pop_front();
        }
        buffer.calls.push_back(call);
    }

    pub(super) fn start(&self, operation: &str) {
        let mut buffer = self.buffer.lock();
        buffer.operation = Some(operation.to_string());
        buffer.started_at = Some(Utc::now());
        buffer.calls.clear();
    }

    pub(super) fn clear(&self) {
        *self.buffer.lock() = TraceBuffer::default();
    }

    pub(super) fn snapshot(&self) -> Trace {
        let buffer = self.buffer.lock();
        Trace::from_calls(
            buffer.operation.clone(),
            buffer.started_at,
            buffer.calls.iter().cloned().collect(),
        )
    }
}
