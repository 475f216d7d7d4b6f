//! Request coalescer implementation

use super::types::{
    CoalescingStats, ErrorHandling, KeyGenerator, PendingRequest, Settlement, StatsCounters,
    publish,
};
use crate::config::CoalescerConfig;
use crate::utils::error::{FetchError, Result, SharedError};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::FutureExt;
use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

type PendingTable<T> = DashMap<String, PendingRequest<T>>;

/// Deduplicates concurrent fetches of the same key
pub struct RequestCoalescer<T> {
    config: CoalescerConfig,
    pending: Arc<PendingTable<T>>,
    stats: StatsCounters,
    next_id: AtomicU64,
    key_generator: Option<KeyGenerator>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl<T> fmt::Debug for RequestCoalescer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestCoalescer")
            .field("config", &self.config)
            .field("pending", &self.pending.len())
            .field("custom_keys", &self.key_generator.is_some())
            .finish_non_exhaustive()
    }
}

impl<T> RequestCoalescer<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(config: CoalescerConfig) -> Self {
        Self {
            config,
            pending: Arc::new(DashMap::new()),
            stats: StatsCounters::default(),
            next_id: AtomicU64::new(1),
            key_generator: None,
            sweeper: Mutex::new(None),
        }
    }

    pub fn with_key_generator(mut self, generator: KeyGenerator) -> Self {
        self.key_generator = Some(generator);
        self
    }

    pub fn config(&self) -> &CoalescerConfig {
        &self.config
    }

    fn generate_key(&self, key: &str) -> String {
        match &self.key_generator {
            Some(generator) => generator(key),
            None => key.to_string(),
        }
    }

    /// Run `fetch` for `key` unless a fetch for the same key is already in
    /// flight, in which case wait for that one instead.
    ///
    /// The fetch runs on its own task, so cancelling the caller that started
    /// it does not affect the other waiters.
    pub async fn coalesce<F, Fut>(&self, key: &str, fetch: F) -> std::result::Result<T, SharedError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let key = self.generate_key(key);
        let started = Instant::now();
        self.stats.total.fetch_add(1, Ordering::Relaxed);

        // Checked before taking the entry: `len()` locks every shard.
        if !self.pending.contains_key(&key) && self.pending.len() >= self.config.max_concurrent_keys
        {
            debug!("Pending table full, fetching {} without coalescing", key);
            self.stats.unique.fetch_add(1, Ordering::Relaxed);
            let result = run_fetch(&key, fetch).await;
            return self.finish(started, result);
        }

        let receiver = match self.pending.entry(key.clone()) {
            Entry::Occupied(mut entry) => {
                let request = entry.get_mut();
                request.waiter_count += 1;
                self.stats.coalesced.fetch_add(1, Ordering::Relaxed);
                debug!(
                    "Coalescing request for {} ({} waiters)",
                    key, request.waiter_count
                );
                request.sender.subscribe()
            }
            Entry::Vacant(entry) => {
                self.stats.unique.fetch_add(1, Ordering::Relaxed);
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                let (sender, receiver) = watch::channel(None);
                let sender = Arc::new(sender);
                entry.insert(PendingRequest {
                    key: key.clone(),
                    id,
                    started_at: Instant::now(),
                    waiter_count: 1,
                    sender: sender.clone(),
                });
                self.spawn_fetch(key, id, sender, fetch);
                receiver
            }
        };

        let result = wait_for_settlement(receiver).await;
        self.finish(started, result)
    }

    fn spawn_fetch<F, Fut>(
        &self,
        key: String,
        id: u64,
        sender: Arc<super::types::SettlementCell<T>>,
        fetch: F,
    ) where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let pending = self.pending.clone();
        let window = self.config.coalescing_window();

        tokio::spawn(async move {
            if !window.is_zero() {
                tokio::time::sleep(window).await;
            }
            let result = run_fetch(&key, fetch).await;

            // Removed before publishing so that a caller arriving after
            // settlement starts a fresh fetch.
            pending.remove_if(&key, |_, request| request.id == id);
            if !publish(&sender, result) {
                debug!("Discarding late result for {}", key);
            }
        });
    }

    fn finish(
        &self,
        started: Instant,
        result: Settlement<T>,
    ) -> std::result::Result<T, SharedError> {
        let waited = started.elapsed().as_micros().min(u64::MAX as u128) as u64;
        self.stats.wait_micros.fetch_add(waited, Ordering::Relaxed);

        result.map_err(|error| {
            self.stats.errors.fetch_add(1, Ordering::Relaxed);
            match self.config.error_handling {
                ErrorHandling::Share => error,
                ErrorHandling::Isolate => Arc::new((*error).clone()),
            }
        })
    }

    /// Spawn the periodic sweep of stale entries
    pub fn start(&self) {
        let mut sweeper = self.sweeper.lock();
        if sweeper.is_some() {
            return;
        }

        let pending = self.pending.clone();
        let interval = self.config.cleanup_interval();
        let max_pending = self.config.max_pending_time();

        *sweeper = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                purge_stale(&pending, max_pending);
            }
        }));
        info!("Request coalescer sweep started ({:?} interval)", interval);
    }

    /// Purge entries older than the pending ceiling once; returns how many
    pub fn cleanup_stale(&self) -> usize {
        purge_stale(&self.pending, self.config.max_pending_time())
    }

    /// Stop the sweep and reject every remaining waiter
    pub fn close(&self) {
        if let Some(handle) = self.sweeper.lock().take() {
            handle.abort();
        }

        let keys: Vec<String> = self.pending.iter().map(|e| e.key().clone()).collect();
        for key in keys {
            if let Some((_, request)) = self.pending.remove(&key) {
                publish(
                    &request.sender,
                    Err(Arc::new(FetchError::internal(format!(
                        "Request coalescer closed while {} was pending",
                        key
                    )))),
                );
            }
        }
        info!("Request coalescer closed");
    }

    pub fn is_pending(&self, key: &str) -> bool {
        self.pending.contains_key(&self.generate_key(key))
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn get_stats(&self) -> CoalescingStats {
        self.stats.snapshot(self.pending.len())
    }

    pub fn reset_stats(&self) {
        self.stats.reset();
    }
}

impl<T> Drop for RequestCoalescer<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.sweeper.get_mut().take() {
            handle.abort();
        }
    }
}

/// Run a fetch, turning a panic into an internal error
async fn run_fetch<T, F, Fut>(key: &str, fetch: F) -> Settlement<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    match AssertUnwindSafe(async move { fetch().await })
        .catch_unwind()
        .await
    {
        Ok(result) => result.map_err(Arc::new),
        Err(panic) => {
            warn!("Fetch for {} panicked", key);
            Err(Arc::new(FetchError::from_panic(
                &format!("Fetch for {}", key),
                panic,
            )))
        }
    }
}

async fn wait_for_settlement<T: Clone>(
    mut receiver: watch::Receiver<Option<Settlement<T>>>,
) -> Settlement<T> {
    match receiver.wait_for(Option::is_some).await {
        Ok(settled) => match settled.as_ref() {
            Some(settlement) => settlement.clone(),
            None => Err(Arc::new(FetchError::internal("Settlement missing"))),
        },
        Err(_) => Err(Arc::new(FetchError::internal(
            "Pending request dropped before it settled",
        ))),
    }
}

fn purge_stale<T>(pending: &PendingTable<T>, max_pending: Duration) -> usize {
    let stale: Vec<(String, u64)> = pending
        .iter()
        .filter(|entry| entry.started_at.elapsed() >= max_pending)
        .map(|entry| (entry.key().clone(), entry.id))
        .collect();

    let mut purged = 0;
    for (key, id) in stale {
        if let Some((_, request)) = pending.remove_if(&key, |_, request| request.id == id) {
            let waited_ms = request.started_at.elapsed().as_millis() as u64;
            warn!(
                "Purging stale request for {} after {}ms ({} waiters)",
                key, waited_ms, request.waiter_count
            );
            publish(
                &request.sender,
                Err(Arc::new(FetchError::PendingTimeout { key, waited_ms })),
            );
            purged += 1;
        }
    }
    purged
}
