//! Time-bounded result cache
//!
//! Results are reused for a fixed interval and may be stale by up to that
//! long. Failures are never cached.

use async_trait::async_trait;
use moka::future::Cache;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::ContentStore;
use crate::error::StoreError;
use crate::query::Query;

/// Wraps a store with an in-process TTL cache keyed by query text and params
pub struct CachedStore<S> {
    inner: S,
    cache: Cache<String, Value>,
}

impl<S: ContentStore> CachedStore<S> {
    pub fn new(inner: S, ttl: Duration, capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .build();
        Self { inner, cache }
    }
}

#[async_trait]
impl<S: ContentStore> ContentStore for CachedStore<S> {
    async fn fetch(&self, query: &Query) -> Result<Value, StoreError> {
        let key = query.cache_key();
        if let Some(value) = self.cache.get(&key).await {
            debug!(request = query.request().name(), "cache hit");
            return Ok(value);
        }

        let value = self.inner.fetch(query).await?;
        self.cache.insert(key, value.clone()).await;
        debug!(request = query.request().name(), "cache miss, stored");
        Ok(value)
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}
