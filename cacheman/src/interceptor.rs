//! Transparent capture of a response on its way to the client.

use std::io;

use bytes::{Bytes, BytesMut};
use http::{HeaderMap, StatusCode};

use crate::sink::ResponseSink;

/// Progress of the wrapped response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterceptorState {
    /// Nothing sent yet.
    Uninitialized,
    /// Status and headers sent, no body yet.
    HeaderCommitted,
    /// At least one body chunk sent.
    BodyWritten,
}

/// Everything the client received, as captured by an [`Interceptor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedResponse {
    /// Committed status.
    pub status: StatusCode,
    /// Headers as they were at commit time.
    pub headers: HeaderMap,
    /// Every body byte accepted by the sink, in order.
    pub body: Bytes,
}

/// Wraps a [`ResponseSink`], forwarding everything while keeping a copy.
///
/// The client sees exactly what it would have seen without the wrapper.
/// The copy is taken from the inner sink's point of view: the status of the
/// first commit, the headers at that moment, and the bytes the sink actually
/// accepted. Once the inner sink rejects a write the capture is incomplete
/// and [`into_captured`](Interceptor::into_captured) yields nothing.
#[derive(Debug)]
pub struct Interceptor<S> {
    inner: S,
    state: InterceptorState,
    status: Option<StatusCode>,
    headers: HeaderMap,
    content: BytesMut,
    failed: bool,
}

impl<S> Interceptor<S>
where
    S: ResponseSink,
{
    /// Wrap a sink.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            state: InterceptorState::Uninitialized,
            status: None,
            headers: HeaderMap::new(),
            content: BytesMut::new(),
            failed: false,
        }
    }

    /// Current state.
    pub fn state(&self) -> InterceptorState {
        self.state
    }

    /// Committed status, `None` while uninitialized.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Body bytes captured so far.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Header snapshot taken at commit time. Empty before commit.
    pub fn committed_headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Whether a body write was rejected by the inner sink.
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// Unwrap the inner sink, discarding the capture.
    pub fn into_inner(self) -> S {
        self.inner
    }

    /// The captured response, or `None` if nothing was ever committed or a
    /// write failed.
    pub fn into_captured(self) -> Option<CapturedResponse> {
        if self.failed {
            return None;
        }
        let status = self.status?;
        Some(CapturedResponse {
            status,
            headers: self.headers,
            body: self.content.freeze(),
        })
    }
}

impl<S> ResponseSink for Interceptor<S>
where
    S: ResponseSink,
{
    fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    fn commit(&mut self, status: StatusCode) {
        if self.state != InterceptorState::Uninitialized {
            return;
        }
        self.status = Some(status);
        self.headers = self.inner.headers().clone();
        self.inner.commit(status);
        self.state = InterceptorState::HeaderCommitted;
    }

    fn write(&mut self, chunk: &[u8]) -> io::Result<usize> {
        if self.state == InterceptorState::Uninitialized {
            self.commit(StatusCode::OK);
        }
        let written = match self.inner.write(chunk) {
            Ok(0) if !chunk.is_empty() => {
                self.failed = true;
                return Ok(0);
            }
            Ok(written) => written,
            Err(error) => {
                self.failed = true;
                return Err(error);
            }
        };
        self.content.extend_from_slice(&chunk[..written.min(chunk.len())]);
        self.state = InterceptorState::BodyWritten;
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use http::HeaderValue;
    use http::header::{CONTENT_TYPE, ETAG};

    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        headers: HeaderMap,
        commits: Vec<StatusCode>,
        body: Vec<u8>,
        accept_at_most: Option<usize>,
        fail_writes: bool,
    }

    impl ResponseSink for RecordingSink {
        fn headers(&self) -> &HeaderMap {
            &self.headers
        }

        fn headers_mut(&mut self) -> &mut HeaderMap {
            &mut self.headers
        }

        fn commit(&mut self, status: StatusCode) {
            self.commits.push(status);
        }

        fn write(&mut self, chunk: &[u8]) -> io::Result<usize> {
            if self.fail_writes {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "client gone"));
            }
            let n = self.accept_at_most.map_or(chunk.len(), |max| max.min(chunk.len()));
            self.body.extend_from_slice(&chunk[..n]);
            Ok(n)
        }
    }

    #[test]
    fn commit_is_forwarded_once() {
        let mut interceptor = Interceptor::new(RecordingSink::default());
        interceptor.commit(StatusCode::CREATED);
        interceptor.commit(StatusCode::INTERNAL_SERVER_ERROR);

        assert_eq!(interceptor.state(), InterceptorState::HeaderCommitted);
        assert_eq!(interceptor.status(), Some(StatusCode::CREATED));
        assert_eq!(interceptor.into_inner().commits, vec![StatusCode::CREATED]);
    }

    #[test]
    fn write_without_commit_implies_ok() {
        let mut interceptor = Interceptor::new(RecordingSink::default());
        assert_eq!(interceptor.status(), None);
        interceptor.write(b"ok").unwrap();

        assert_eq!(interceptor.state(), InterceptorState::BodyWritten);
        assert_eq!(interceptor.status(), Some(StatusCode::OK));
        let sink = interceptor.into_inner();
        assert_eq!(sink.commits, vec![StatusCode::OK]);
        assert_eq!(sink.body, b"ok");
    }

    #[test]
    fn body_chunks_are_appended() {
        let mut interceptor = Interceptor::new(RecordingSink::default());
        interceptor.commit(StatusCode::OK);
        interceptor.write(b"hello, ").unwrap();
        interceptor.write(b"world").unwrap();

        assert_eq!(interceptor.content(), b"hello, world");
        let captured = interceptor.into_captured().unwrap();
        assert_eq!(captured.body, Bytes::from_static(b"hello, world"));
    }

    #[test]
    fn only_accepted_bytes_are_captured() {
        let sink = RecordingSink {
            accept_at_most: Some(3),
            ..Default::default()
        };
        let mut interceptor = Interceptor::new(sink);
        assert_eq!(interceptor.write(b"abcdef").unwrap(), 3);
        assert_eq!(interceptor.content(), b"abc");
        assert!(!interceptor.is_failed());
    }

    #[test]
    fn failed_write_captures_nothing() {
        let sink = RecordingSink {
            fail_writes: true,
            ..Default::default()
        };
        let mut interceptor = Interceptor::new(sink);
        assert!(interceptor.write(b"lost").is_err());
        assert!(interceptor.content().is_empty());
        assert_eq!(interceptor.status(), Some(StatusCode::OK));
        assert!(interceptor.is_failed());
        assert!(interceptor.into_captured().is_none());
    }

    #[test]
    fn later_success_does_not_clear_failure() {
        let mut interceptor = Interceptor::new(RecordingSink::default());
        interceptor.write(b"part1-").unwrap();
        interceptor.inner.fail_writes = true;
        assert!(interceptor.write(b"part2").is_err());
        interceptor.inner.fail_writes = false;
        interceptor.write(b"part3").unwrap();

        assert!(interceptor.is_failed());
        assert!(interceptor.into_captured().is_none());
    }

    #[test]
    fn zero_length_write_counts_as_failure() {
        let sink = RecordingSink {
            accept_at_most: Some(0),
            ..Default::default()
        };
        let mut interceptor = Interceptor::new(sink);
        assert_eq!(interceptor.write(b"stuck").unwrap(), 0);
        assert!(interceptor.is_failed());
        assert!(interceptor.into_captured().is_none());
    }

    #[test]
    fn headers_are_live_until_commit() {
        let mut interceptor = Interceptor::new(RecordingSink::default());
        interceptor
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        assert_eq!(interceptor.headers()[CONTENT_TYPE], "text/plain");
        assert!(interceptor.committed_headers().is_empty());

        interceptor.commit(StatusCode::OK);
        interceptor
            .headers_mut()
            .insert(ETAG, HeaderValue::from_static("\"late\""));

        let captured = interceptor.into_captured().unwrap();
        assert_eq!(captured.headers[CONTENT_TYPE], "text/plain");
        assert!(!captured.headers.contains_key(ETAG));
    }

    #[test]
    fn nothing_committed_means_nothing_captured() {
        let interceptor = Interceptor::new(RecordingSink::default());
        assert_eq!(interceptor.state(), InterceptorState::Uninitialized);
        assert!(interceptor.into_captured().is_none());
    }
}
