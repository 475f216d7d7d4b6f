//! Leaf fetcher backed by the upstream client

use super::resource::{ResourceKey, ResponseBody};
use super::traits::{CacheStore, Fetcher, MetricSink};
use super::upstream::{RequestOptions, UpstreamClient};
use crate::monitoring::RequestSample;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Status recorded for failures that produced no HTTP response
const TRANSPORT_FAILURE_STATUS: u16 = 599;

/// Reads through the cache, falls back to the upstream, and reports one
/// metric per fetch
pub struct CatalogFetcher {
    upstream: Arc<UpstreamClient>,
    cache: Option<Arc<dyn CacheStore>>,
    metrics: Option<Arc<dyn MetricSink>>,
}

impl CatalogFetcher {
    pub fn new(upstream: Arc<UpstreamClient>) -> Self {
        Self {
            upstream,
            cache: None,
            metrics: None,
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn CacheStore>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn MetricSink>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn upstream(&self) -> &Arc<UpstreamClient> {
        &self.upstream
    }

    fn record(&self, sample: RequestSample) {
        if let Some(metrics) = &self.metrics {
            metrics.record(sample);
        }
    }
}

#[async_trait]
impl Fetcher for CatalogFetcher {
    type Output = ResponseBody;

    async fn fetch(&self, key: &ResourceKey) -> Result<ResponseBody> {
        let cache_key = key.canonical();

        if let Some(cache) = &self.cache {
            let clock = Instant::now();
            if let Some(body) = cache.get(&cache_key).await {
                debug!("Cache hit for {}", cache_key);
                self.record(
                    RequestSample::new(&cache_key, clock.elapsed().as_secs_f64() * 1000.0, 200)
                        .with_resource(key)
                        .with_cache_hit(true)
                        .with_content_size(body.size_bytes()),
                );
                return Ok(body);
            }
        }

        let options = RequestOptions {
            query: key.query_pairs(),
            ..RequestOptions::default()
        };
        let result = self.upstream.request(&key.endpoint, options).await;

        let status = result.status_code.unwrap_or(if result.success {
            200
        } else {
            TRANSPORT_FAILURE_STATUS
        });
        self.record(
            RequestSample::new(&cache_key, result.duration_ms, status)
                .with_resource(key)
                .with_cache_hit(result.cache_status.is_hit())
                .with_compressed(result.compressed())
                .with_content_size(result.data.as_ref().map_or(0, ResponseBody::size_bytes)),
        );

        let body = result.into_result()?;
        if let Some(cache) = &self.cache {
            cache.set(&cache_key, body.clone()).await;
        }
        Ok(body)
    }
}
