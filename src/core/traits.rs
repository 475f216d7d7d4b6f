//! Narrow capability traits the core depends on
//!
//! Collaborators plug concrete adapters in through these seams instead of
//! handing the core untyped objects.

use crate::core::resource::{ResourceKey, ResponseBody};
use crate::monitoring::RequestSample;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Anything that can produce the value for a resource key
#[async_trait]
pub trait Fetcher: Send + Sync + 'static {
    type Output: Clone + Send + Sync + 'static;

    async fn fetch(&self, key: &ResourceKey) -> Result<Self::Output>;
}

#[async_trait]
impl<F: Fetcher> Fetcher for Arc<F> {
    type Output = F::Output;

    async fn fetch(&self, key: &ResourceKey) -> Result<Self::Output> {
        (**self).fetch(key).await
    }
}

/// Receives one sample per completed request
pub trait MetricSink: Send + Sync {
    fn record(&self, sample: RequestSample);
}

/// External key/value cache the fetch path reads through and populates
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Option<ResponseBody>;

    async fn set(&self, key: &str, value: ResponseBody);

    async fn invalidate(&self, key: &str);
}
