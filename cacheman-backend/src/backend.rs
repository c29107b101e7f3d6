use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::{BackendError, DeleteStatus};

/// Result of every [`Backend`] operation.
pub type BackendResult<T> = Result<T, BackendError>;

/// Storage capability consumed by the cache orchestrator.
///
/// Keys are opaque strings (the full request target) and values are the
/// already-encoded cache entries. Expiration is a property of the backend,
/// fixed when it is constructed, never passed per call.
#[async_trait]
pub trait Backend: Sync + Send {
    /// Reads a stored value. `Ok(None)` means the key is absent.
    async fn get(&self, key: &str) -> BackendResult<Option<Bytes>>;

    /// Inserts or replaces the value stored under `key`.
    async fn set(&self, key: &str, value: Bytes) -> BackendResult<()>;

    /// Removes `key`. A missing key is reported as [`DeleteStatus::Missing`], not as an error.
    async fn delete(&self, key: &str) -> BackendResult<DeleteStatus>;

    /// Clears every entry this backend owns.
    async fn reset(&self) -> BackendResult<()>;

    /// Identifies the backend kind in cache info reports.
    fn type_name(&self) -> &str {
        "backend"
    }
}

#[async_trait]
impl<B> Backend for &B
where
    B: Backend + ?Sized,
{
    async fn get(&self, key: &str) -> BackendResult<Option<Bytes>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: Bytes) -> BackendResult<()> {
        (**self).set(key, value).await
    }

    async fn delete(&self, key: &str) -> BackendResult<DeleteStatus> {
        (**self).delete(key).await
    }

    async fn reset(&self) -> BackendResult<()> {
        (**self).reset().await
    }

    fn type_name(&self) -> &str {
        (**self).type_name()
    }
}

#[async_trait]
impl Backend for Box<dyn Backend> {
    async fn get(&self, key: &str) -> BackendResult<Option<Bytes>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: Bytes) -> BackendResult<()> {
        (**self).set(key, value).await
    }

    async fn delete(&self, key: &str) -> BackendResult<DeleteStatus> {
        (**self).delete(key).await
    }

    async fn reset(&self) -> BackendResult<()> {
        (**self).reset().await
    }

    fn type_name(&self) -> &str {
        (**self).type_name()
    }
}

#[async_trait]
impl Backend for Arc<dyn Backend + Send + Sync + 'static> {
    async fn get(&self, key: &str) -> BackendResult<Option<Bytes>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: Bytes) -> BackendResult<()> {
        (**self).set(key, value).await
    }

    async fn delete(&self, key: &str) -> BackendResult<DeleteStatus> {
        (**self).delete(key).await
    }

    async fn reset(&self) -> BackendResult<()> {
        (**self).reset().await
    }

    fn type_name(&self) -> &str {
        (**self).type_name()
    }
}
