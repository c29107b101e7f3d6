//! Downstream adapter for bridging Tower services to cacheman.
//!
//! [`TowerDownstream`] implements [`Downstream`] for a Tower service and a
//! request, so the cache manager can call the wrapped service on a miss or a
//! bypass. Users typically don't interact with this module directly, it is
//! used by [`CacheService`](crate::service::CacheService).

use std::io;
use std::pin::pin;

use async_trait::async_trait;
use bytes::Buf;
use cacheman::{Downstream, ResponseSink};
use http::{Request, Response};
use http_body::Body as HttpBody;
use http_body_util::BodyExt;
use tower::{BoxError, Service};

/// A single pending call of a Tower service.
///
/// Running it calls the service, copies the response headers into the sink,
/// commits the status and streams every data frame into the sink. Trailers
/// are dropped.
///
/// The service must already be ready, as it is after `poll_ready` inside
/// [`CacheService`](crate::service::CacheService).
pub struct TowerDownstream<S, ReqBody> {
    service: S,
    request: Request<ReqBody>,
}

impl<S, ReqBody> TowerDownstream<S, ReqBody> {
    /// Bind a ready service to the request it will receive.
    pub fn new(service: S, request: Request<ReqBody>) -> Self {
        Self { service, request }
    }
}

#[async_trait]
impl<S, ReqBody, ResBody> Downstream for TowerDownstream<S, ReqBody>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Send + 'static,
    S::Future: Send,
    S::Error: Into<BoxError>,
    ReqBody: Send + 'static,
    ResBody: HttpBody + Send + 'static,
    ResBody::Data: Send,
    ResBody::Error: Into<BoxError>,
{
    type Error = BoxError;

    async fn run(mut self, sink: &mut dyn ResponseSink) -> Result<(), Self::Error> {
        let response = self.service.call(self.request).await.map_err(Into::into)?;
        let (parts, body) = response.into_parts();
        let mut body = pin!(body);

        let headers = sink.headers_mut();
        for (name, value) in &parts.headers {
            headers.append(name.clone(), value.clone());
        }
        sink.commit(parts.status);

        while let Some(frame) = body.frame().await {
            let frame = frame.map_err(Into::into)?;
            if let Ok(mut data) = frame.into_data() {
                while data.has_remaining() {
                    let written = sink.write(data.chunk())?;
                    if written == 0 {
                        return Err(io::Error::from(io::ErrorKind::WriteZero).into());
                    }
                    data.advance(written);
                }
            }
        }
        Ok(())
    }
}
