//! Moka backend implementation.

use async_trait::async_trait;
use bytes::Bytes;
use cacheman_backend::{Backend, BackendResult, DeleteStatus};
use moka::future::Cache;

/// In-memory cache backend powered by Moka.
///
/// `MokaBackend` provides a concurrent in-process cache with automatic entry
/// expiration. Every entry lives for the TTL chosen at build time.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use cacheman_moka::MokaBackend;
///
/// let backend = MokaBackend::builder(10_000)
///     .ttl(Duration::from_secs(60))
///     .build();
/// ```
///
/// # Caveats
///
/// - Data is **not persisted** — cache is lost on process restart
/// - Data is **not shared** across processes — use Redis for distributed caching
/// - Expiration is **best-effort** — expired entries may briefly remain readable
///   until Moka's background eviction runs
#[derive(Clone)]
pub struct MokaBackend {
    pub(crate) cache: Cache<String, Bytes>,
    pub(crate) label: String,
}

impl std::fmt::Debug for MokaBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaBackend")
            .field("label", &self.label)
            .field("cache", &self.cache)
            .finish()
    }
}

impl MokaBackend {
    /// Creates a new builder for `MokaBackend` with the specified maximum capacity.
    ///
    /// The `max_capacity` determines the maximum number of entries the cache can hold.
    pub fn builder(max_capacity: u64) -> crate::builder::MokaBackendBuilder {
        crate::builder::MokaBackendBuilder::new(max_capacity)
    }

    /// Access to the underlying Moka cache.
    pub fn cache(&self) -> &Cache<String, Bytes> {
        &self.cache
    }
}

#[async_trait]
impl Backend for MokaBackend {
    async fn get(&self, key: &str) -> BackendResult<Option<Bytes>> {
        Ok(self.cache.get(key).await)
    }

    async fn set(&self, key: &str, value: Bytes) -> BackendResult<()> {
        self.cache.insert(key.to_owned(), value).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> BackendResult<DeleteStatus> {
        match self.cache.remove(key).await {
            Some(_) => Ok(DeleteStatus::Deleted(1)),
            None => Ok(DeleteStatus::Missing),
        }
    }

    async fn reset(&self) -> BackendResult<()> {
        self.cache.invalidate_all();
        // invalidate_all is lazy; flush it so readers observe an empty cache.
        self.cache.run_pending_tasks().await;
        Ok(())
    }

    fn type_name(&self) -> &str {
        &self.label
    }
}
