//! Shared fixtures: in-memory backends and a scripted handler.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use cacheman::{Backend, BackendError, BufferedResponse, DeleteStatus, Downstream, ResponseSink};
use cacheman::backend::BackendResult;
use dashmap::DashMap;
use http::{HeaderMap, HeaderName, HeaderValue, Method, Request, StatusCode, request::Parts};

/// DashMap backend counting every call.
#[derive(Clone, Default)]
pub struct MockBackend {
    store: Arc<DashMap<String, Bytes>>,
    pub gets: Arc<AtomicUsize>,
    pub sets: Arc<AtomicUsize>,
    pub resets: Arc<AtomicUsize>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self, key: &str) -> Option<Bytes> {
        self.store.get(key).map(|v| v.clone())
    }

    pub fn put_raw(&self, key: &str, value: &'static [u8]) {
        self.store.insert(key.to_owned(), Bytes::from_static(value));
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn set_count(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn get(&self, key: &str) -> BackendResult<Option<Bytes>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        Ok(self.store.get(key).map(|v| v.clone()))
    }

    async fn set(&self, key: &str, value: Bytes) -> BackendResult<()> {
        self.sets.fetch_add(1, Ordering::SeqCst);
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
        self.resets.fetch_add(1, Ordering::SeqCst);
        self.store.clear();
        Ok(())
    }

    fn type_name(&self) -> &str {
        "mock"
    }
}

/// Backend failing every operation.
#[derive(Clone, Default)]
pub struct FailingBackend;

fn simulated() -> BackendError {
    BackendError::connection(std::io::Error::other("backend unreachable"))
}

#[async_trait]
impl Backend for FailingBackend {
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
        "failing"
    }
}

/// Handler failure.
#[derive(Debug, PartialEq, Eq)]
pub struct HandlerError;

/// Handler writing a fixed response and counting its invocations.
#[derive(Clone)]
pub struct Handler {
    status: Option<StatusCode>,
    headers: Vec<(HeaderName, HeaderValue)>,
    chunks: Vec<&'static [u8]>,
    fail: bool,
    ignore_write_errors: bool,
    pub calls: Arc<AtomicUsize>,
}

impl Handler {
    /// Writes the body without committing a status.
    pub fn body(chunks: &[&'static [u8]]) -> Self {
        Self {
            status: None,
            headers: Vec::new(),
            chunks: chunks.to_vec(),
            fail: false,
            ignore_write_errors: false,
            calls: Arc::default(),
        }
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    pub fn header(mut self, name: &'static str, value: &'static str) -> Self {
        self.headers.push((
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        ));
        self
    }

    /// Writes its response, then reports failure.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Keeps writing after the sink rejects a chunk and reports success.
    pub fn ignoring_write_errors(mut self) -> Self {
        self.ignore_write_errors = true;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Downstream for Handler {
    type Error = HandlerError;

    async fn run(self, sink: &mut dyn ResponseSink) -> Result<(), Self::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        for (name, value) in self.headers {
            sink.headers_mut().append(name, value);
        }
        if let Some(status) = self.status {
            sink.commit(status);
        }
        for chunk in self.chunks {
            match sink.write(chunk) {
                Ok(_) => {}
                Err(_) if self.ignore_write_errors => {}
                Err(_) => return Err(HandlerError),
            }
        }
        if self.fail {
            return Err(HandlerError);
        }
        Ok(())
    }
}

/// Client connection dropping after a number of body writes.
pub struct ClosingSink {
    pub inner: BufferedResponse,
    writes_left: usize,
}

impl ClosingSink {
    pub fn after(writes: usize) -> Self {
        Self {
            inner: BufferedResponse::new(),
            writes_left: writes,
        }
    }
}

impl ResponseSink for ClosingSink {
    fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    fn commit(&mut self, status: StatusCode) {
        self.inner.commit(status);
    }

    fn write(&mut self, chunk: &[u8]) -> std::io::Result<usize> {
        if self.writes_left == 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "client disconnected",
            ));
        }
        self.writes_left -= 1;
        self.inner.write(chunk)
    }
}

pub fn request(method: Method, target: &str) -> Parts {
    Request::builder()
        .method(method)
        .uri(target)
        .body(())
        .unwrap()
        .into_parts()
        .0
}

pub fn get(target: &str) -> Parts {
    request(Method::GET, target)
}
