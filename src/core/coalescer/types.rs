//! Coalescer types

use crate::utils::error::SharedError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tokio::time::Instant;

/// How an error is handed to concurrent waiters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorHandling {
    /// Every waiter receives its own copy
    #[default]
    Isolate,
    /// Every waiter receives the same allocation
    Share,
}

/// Maps a caller-supplied key to the key used for deduplication
pub type KeyGenerator = Arc<dyn Fn(&str) -> String + Send + Sync>;

pub(super) type Settlement<T> = Result<T, SharedError>;

/// Broadcast cell: `None` until the request settles
pub(super) type SettlementCell<T> = watch::Sender<Option<Settlement<T>>>;

/// An in-flight fetch
#[derive(Debug)]
pub struct PendingRequest<T> {
    pub key: String,
    /// Distinguishes this fetch from a later one for the same key
    pub id: u64,
    pub started_at: Instant,
    /// Callers waiting on this fetch, including the one that started it
    pub waiter_count: usize,
    pub(super) sender: Arc<SettlementCell<T>>,
}

/// Publish a settlement. The first one wins; later ones are discarded.
pub(super) fn publish<T>(cell: &SettlementCell<T>, settlement: Settlement<T>) -> bool {
    cell.send_if_modified(|slot| {
        if slot.is_none() {
            *slot = Some(settlement);
            true
        } else {
            false
        }
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoalescingStats {
    pub total_requests: u64,
    /// Requests that joined an in-flight fetch
    pub coalesced_requests: u64,
    /// Requests that started a fetch (or bypassed coalescing)
    pub unique_requests: u64,
    pub coalescing_rate: f64,
    pub average_wait_time_ms: f64,
    pub error_count: u64,
    pub error_rate: f64,
    pub pending_count: usize,
}

#[derive(Debug, Default)]
pub(super) struct StatsCounters {
    pub total: AtomicU64,
    pub coalesced: AtomicU64,
    pub unique: AtomicU64,
    pub errors: AtomicU64,
    pub wait_micros: AtomicU64,
}

impl StatsCounters {
    pub fn snapshot(&self, pending_count: usize) -> CoalescingStats {
        let total = self.total.load(Ordering::Relaxed);
        let coalesced = self.coalesced.load(Ordering::Relaxed);
        let errors = self.errors.load(Ordering::Relaxed);
        let wait_micros = self.wait_micros.load(Ordering::Relaxed);

        let percent = |part: u64| {
            if total == 0 {
                0.0
            } else {
                part as f64 / total as f64 * 100.0
            }
        };

        CoalescingStats {
            total_requests: total,
            coalesced_requests: coalesced,
            unique_requests: self.unique.load(Ordering::Relaxed),
            coalescing_rate: percent(coalesced),
            average_wait_time_ms: if total == 0 {
                0.0
            } else {
                wait_micros as f64 / total as f64 / 1000.0
            },
            error_count: errors,
            error_rate: percent(errors),
            pending_count,
        }
    }

    pub fn reset(&self) {
        for counter in [
            &self.total,
            &self.coalesced,
            &self.unique,
            &self.errors,
            &self.wait_micros,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}
