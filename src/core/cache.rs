//! In-memory `CacheStore` adapter

use super::resource::ResponseBody;
use super::traits::CacheStore;
use crate::config::CacheConfig;
use async_trait::async_trait;
use moka::future::Cache;

/// Bounded TTL cache on `moka`
#[derive(Clone)]
pub struct MemoryCacheStore {
    cache: Cache<String, ResponseBody>,
}

impl std::fmt::Debug for MemoryCacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCacheStore")
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

impl MemoryCacheStore {
    pub fn new(config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_entries)
            .time_to_live(config.ttl())
            .build();
        Self { cache }
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Option<ResponseBody> {
        self.cache.get(key).await
    }

    async fn set(&self, key: &str, value: ResponseBody) {
        self.cache.insert(key.to_string(), value).await;
    }

    async fn invalidate(&self, key: &str) {
        self.cache.invalidate(key).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_invalidate() {
        let store = MemoryCacheStore::new(&CacheConfig::default());
        let body = ResponseBody::Text("\\id TIT".to_string());

        assert!(store.get("k").await.is_none());
        store.set("k", body.clone()).await;
        assert_eq!(store.get("k").await, Some(body));

        store.invalidate("k").await;
        assert!(store.get("k").await.is_none());
    }
}
