//! Destination of a response as it is being produced.

use std::io;

use bytes::{Bytes, BytesMut};
use http::{HeaderMap, Response, StatusCode};

/// Where a handler writes its response.
///
/// Header mutations are only meaningful before [`commit`](ResponseSink::commit).
/// Writing a body chunk before committing commits `200 OK` implicitly.
pub trait ResponseSink: Send {
    /// Headers that will be (or were) sent.
    fn headers(&self) -> &HeaderMap;

    /// Mutable headers. Changes after commit are not sent.
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Send the status line and headers. Only the first call has effect.
    fn commit(&mut self, status: StatusCode);

    /// Append a chunk to the body, returning how many bytes were accepted.
    fn write(&mut self, chunk: &[u8]) -> io::Result<usize>;
}

impl<S> ResponseSink for &mut S
where
    S: ResponseSink + ?Sized,
{
    fn headers(&self) -> &HeaderMap {
        (**self).headers()
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        (**self).headers_mut()
    }

    fn commit(&mut self, status: StatusCode) {
        (**self).commit(status)
    }

    fn write(&mut self, chunk: &[u8]) -> io::Result<usize> {
        (**self).write(chunk)
    }
}

impl<S> ResponseSink for Box<S>
where
    S: ResponseSink + ?Sized,
{
    fn headers(&self) -> &HeaderMap {
        (**self).headers()
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        (**self).headers_mut()
    }

    fn commit(&mut self, status: StatusCode) {
        (**self).commit(status)
    }

    fn write(&mut self, chunk: &[u8]) -> io::Result<usize> {
        (**self).write(chunk)
    }
}

/// In-memory sink that assembles an [`http::Response`].
#[derive(Debug, Default)]
pub struct BufferedResponse {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: BytesMut,
}

impl BufferedResponse {
    /// Empty, uncommitted response.
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed status, if any.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Body written so far.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Finish the response. An uncommitted response becomes `200 OK`.
    pub fn into_response(self) -> Response<Bytes> {
        let mut response = Response::new(self.body.freeze());
        *response.status_mut() = self.status.unwrap_or(StatusCode::OK);
        *response.headers_mut() = self.headers;
        response
    }
}

impl ResponseSink for BufferedResponse {
    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn commit(&mut self, status: StatusCode) {
        if self.status.is_none() {
            self.status = Some(status);
        }
    }

    fn write(&mut self, chunk: &[u8]) -> io::Result<usize> {
        if self.status.is_none() {
            self.status = Some(StatusCode::OK);
        }
        self.body.extend_from_slice(chunk);
        Ok(chunk.len())
    }
}
