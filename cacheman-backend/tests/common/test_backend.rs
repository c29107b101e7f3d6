//! Simple in-memory test backend implementation using DashMap.

use async_trait::async_trait;
use bytes::Bytes;
use cacheman_backend::{Backend, BackendError, BackendResult, DeleteStatus};
use dashmap::DashMap;
use std::sync::Arc;

/// Simple in-memory backend for testing using DashMap.
///
/// This backend is thread-safe and can be cloned cheaply (Arc internally).
#[derive(Clone, Default)]
pub struct TestBackend {
    store: Arc<DashMap<String, Bytes>>,
}

impl TestBackend {
    /// Create a new empty test backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a key exists in the backend.
    pub fn has(&self, key: &str) -> bool {
        self.store.contains_key(key)
    }
}

#[async_trait]
impl Backend for TestBackend {
    async fn get(&self, key: &str) -> BackendResult<Option<Bytes>> {
        Ok(self.store.get(key).map(|v| v.clone()))
    }

    async fn set(&self, key: &str, value: Bytes) -> BackendResult<()> {
        self.store.insert(key.to_owned(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> BackendResult<DeleteStatus> {
        Ok(match self.store.remove(key) {
            Some(_) => DeleteStatus::Deleted(1),
            None => DeleteStatus::Missing,
        })
    }

    async fn reset(&self) -> BackendResult<()> {
        self.store.clear();
        Ok(())
    }

    fn type_name(&self) -> &str {
        "test"
    }
}

/// Backend that always returns errors (for error testing).
#[derive(Clone, Default)]
pub struct ErrorBackend;

fn simulated() -> BackendError {
    BackendError::internal(std::io::Error::other("simulated error"))
}

#[async_trait]
impl Backend for ErrorBackend {
    async fn get(&self, _key: &str) -> BackendResult<Option<Bytes>> {
        Err(simulated())
    }

    async fn set(&self, _key: &str, _value: Bytes) -> BackendResult<()> {
        Err(simulated())
    }

    async fn delete(&self, _key: &str) -> BackendResult<DeleteStatus> {
        Err(simulated())
    }

    async fn reset(&self) -> BackendResult<()> {
        Err(simulated())
    }

    fn type_name(&self) -> &str {
        "error"
    }
}
