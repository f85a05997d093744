//! Content store backends
//!
//! A store executes a composed [`Query`] and returns the raw result tree.
//! `null` is a valid answer (nothing matched); failures are [`StoreError`]s.

mod cached;
mod http;
mod memory;

pub use cached::CachedStore;
pub use http::HttpStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;
use crate::query::Query;

/// Executes read queries against a content store
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Run a query and return its result tree
    async fn fetch(&self, query: &Query) -> Result<Value, StoreError>;

    /// Backend name for logs (e.g., "http", "memory")
    fn name(&self) -> &'static str;
}
