//! Core fetch layer
//!
//! Wires the upstream client, request coalescer, cache warmer and
//! performance monitor into one `FetchLayer`.

pub mod cache;
pub mod coalescer;
pub mod fetcher;
pub mod resource;
pub mod traits;
pub mod upstream;
pub mod warmer;

pub use cache::MemoryCacheStore;
pub use fetcher::CatalogFetcher;
pub use resource::{ResourceKey, ResourceKind, ResponseBody};
pub use traits::{CacheStore, Fetcher, MetricSink};

use crate::config::Config;
use crate::monitoring::{PerformanceInsights, PerformanceMonitor, PerformanceStats};
use crate::utils::error::{Result, SharedError};
use coalescer::{CoalescedFetcher, CoalescingStats, RequestCoalescer};
use std::sync::Arc;
use tracing::{debug, info};
use upstream::{Trace, UpstreamClient};
use warmer::{CacheWarmer, WarmingResult, WarmingStats};

/// The coalesced fetch path shared by callers and the warmer
pub type SharedFetcher = CoalescedFetcher<CatalogFetcher>;

/// The assembled fetch layer
pub struct FetchLayer {
    config: Arc<Config>,
    upstream: Arc<UpstreamClient>,
    monitor: Arc<PerformanceMonitor>,
    cache: Option<Arc<MemoryCacheStore>>,
    fetcher: Arc<SharedFetcher>,
    warmer: Arc<CacheWarmer<SharedFetcher>>,
}

impl FetchLayer {
    pub fn new(config: Config) -> Result<Self> {
        info!("Initializing fetch layer");
        config.validate()?;
        let config = Arc::new(config);

        debug!("Initializing upstream client");
        let upstream = Arc::new(UpstreamClient::new(config.upstream.clone())?);

        let monitor = Arc::new(PerformanceMonitor::new(config.monitoring.clone()));

        let mut catalog = CatalogFetcher::new(upstream.clone()).with_metrics(monitor.clone());
        let cache = if config.cache.enabled {
            debug!("Initializing in-memory cache");
            let store = Arc::new(MemoryCacheStore::new(&config.cache));
            catalog = catalog.with_cache(store.clone());
            Some(store)
        } else {
            None
        };

        let coalescer = Arc::new(RequestCoalescer::new(config.coalescer.clone()));
        let fetcher = Arc::new(CoalescedFetcher::new(Arc::new(catalog), coalescer));

        debug!("Initializing cache warmer");
        let warmer = Arc::new(
            CacheWarmer::new(config.warmer.clone(), fetcher.clone()).with_monitor(monitor.clone()),
        );

        info!("Fetch layer initialized");
        Ok(Self {
            config,
            upstream,
            monitor,
            cache,
            fetcher,
            warmer,
        })
    }

    /// Fetch a resource through the coalesced, cached path
    pub async fn fetch(&self, key: &ResourceKey) -> std::result::Result<ResponseBody, SharedError> {
        self.fetcher.fetch_shared(key).await
    }

    /// Start the coalescer sweep and the warming scheduler
    pub fn start(&self) {
        self.fetcher.coalescer().start();
        self.warmer.start();
        info!("Fetch layer background tasks started");
    }

    /// Run every registered warming job once, regardless of schedule
    pub async fn warm_all(&self) -> Result<Vec<WarmingResult>> {
        let mut results = Vec::new();
        for job in self.warmer.jobs().into_iter().filter(|job| job.enabled) {
            results.push(self.warmer.warm_cache(&job.strategy).await?);
        }
        Ok(results)
    }

    /// Stop background tasks and reject pending waiters
    pub fn close(&self) {
        info!("Shutting down fetch layer");
        self.warmer.close();
        self.fetcher.coalescer().close();
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn upstream(&self) -> &Arc<UpstreamClient> {
        &self.upstream
    }

    pub fn monitor(&self) -> &Arc<PerformanceMonitor> {
        &self.monitor
    }

    pub fn warmer(&self) -> &Arc<CacheWarmer<SharedFetcher>> {
        &self.warmer
    }

    pub fn cache(&self) -> Option<&Arc<MemoryCacheStore>> {
        self.cache.as_ref()
    }

    pub fn get_stats(&self, window_hours: f64) -> PerformanceStats {
        self.monitor.get_stats(window_hours)
    }

    pub fn get_insights(&self) -> PerformanceInsights {
        self.monitor.get_insights()
    }

    pub fn start_trace(&self, operation: &str) {
        self.upstream.start_trace(operation);
    }

    pub fn get_trace(&self) -> Trace {
        self.upstream.get_trace()
    }

    pub fn clear_trace(&self) {
        self.upstream.clear_trace();
    }

    pub fn get_warming_stats(&self) -> WarmingStats {
        self.warmer.get_warming_stats()
    }

    pub fn get_coalescing_stats(&self) -> CoalescingStats {
        self.fetcher.coalescer().get_stats()
    }
}
