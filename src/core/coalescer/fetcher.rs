//! Coalescing adapter over any `Fetcher`

use super::coalescer::RequestCoalescer;
use crate::core::resource::ResourceKey;
use crate::core::traits::Fetcher;
use crate::utils::error::{Result, SharedError};
use async_trait::async_trait;
use std::sync::Arc;

/// Routes fetches through a `RequestCoalescer` keyed by `ResourceKey::canonical()`
pub struct CoalescedFetcher<F: Fetcher> {
    inner: Arc<F>,
    coalescer: Arc<RequestCoalescer<F::Output>>,
}

impl<F: Fetcher> CoalescedFetcher<F> {
    pub fn new(inner: Arc<F>, coalescer: Arc<RequestCoalescer<F::Output>>) -> Self {
        Self { inner, coalescer }
    }

    pub fn coalescer(&self) -> &Arc<RequestCoalescer<F::Output>> {
        &self.coalescer
    }

    pub fn inner(&self) -> &Arc<F> {
        &self.inner
    }

    /// Like `fetch`, but hands back the error as the coalescer delivered it
    pub async fn fetch_shared(
        &self,
        key: &ResourceKey,
    ) -> std::result::Result<F::Output, SharedError> {
        let inner = self.inner.clone();
        let owned = key.clone();
        self.coalescer
            .coalesce(&key.canonical(), move || async move {
                inner.fetch(&owned).await
            })
            .await
    }
}

#[async_trait]
impl<F: Fetcher> Fetcher for CoalescedFetcher<F> {
    type Output = F::Output;

    async fn fetch(&self, key: &ResourceKey) -> Result<Self::Output> {
        self.fetch_shared(key).await.map_err(|e| (*e).clone())
    }
}
