use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use cacheman::{Backend, BufferedResponse, CacheManager, CacheStatus, Disposition};
use futures::future::BoxFuture;
use http::{Request, Response};
use http_body::Body as HttpBody;
use http_body_util::{Either, Full};
use tower::{BoxError, Service};
use tracing::trace;

use crate::downstream::TowerDownstream;

/// Response body of a [`CacheService`].
///
/// `Left` holds buffered responses (hits, misses, info and purge), `Right`
/// the untouched upstream body of bypassed requests.
pub type CacheBody<ResBody> = Either<Full<Bytes>, ResBody>;

/// Tower service answering requests through a [`CacheManager`].
///
/// Bypassed requests go straight to the upstream and its response is
/// returned as is, streaming included. Everything else is buffered. The
/// [`CacheStatus`] of every answered request is attached to the response
/// extensions.
pub struct CacheService<S, B> {
    upstream: S,
    manager: Arc<CacheManager<B>>,
}

impl<S, B> CacheService<S, B> {
    /// Wrap `upstream`, sharing `manager` with other services.
    pub fn new(upstream: S, manager: Arc<CacheManager<B>>) -> Self {
        CacheService { upstream, manager }
    }

    /// Shared manager.
    pub fn manager(&self) -> &Arc<CacheManager<B>> {
        &self.manager
    }
}

impl<S, B> Clone for CacheService<S, B>
where
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            upstream: self.upstream.clone(),
            manager: Arc::clone(&self.manager),
        }
    }
}

impl<S, B, ReqBody, ResBody> Service<Request<ReqBody>> for CacheService<S, B>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send,
    S::Error: Into<BoxError>,
    B: Backend + 'static,
    ReqBody: Send + 'static,
    ResBody: HttpBody<Data = Bytes> + Send + 'static,
    ResBody::Error: Into<BoxError>,
{
    type Response = Response<CacheBody<ResBody>>;
    type Error = BoxError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.upstream.poll_ready(cx).map_err(Into::into)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let manager = Arc::clone(&self.manager);
        // Keep the instance that was driven to readiness for this call.
        let clone = self.upstream.clone();
        let mut upstream = std::mem::replace(&mut self.upstream, clone);

        let (parts, body) = req.into_parts();
        if manager.decide(&parts) == Disposition::Bypass {
            trace!(method = %parts.method, uri = %parts.uri, "Passing request through");
            let response = upstream.call(Request::from_parts(parts, body));
            return Box::pin(async move {
                let (mut parts, body) = response.await.map_err(Into::into)?.into_parts();
                parts.extensions.insert(CacheStatus::Bypass);
                Ok(Response::from_parts(parts, Either::Right(body)))
            });
        }

        Box::pin(async move {
            let request = Request::from_parts(parts.clone(), body);
            let downstream = TowerDownstream::new(upstream, request);
            let mut sink = BufferedResponse::new();

            let status = manager.handle(&parts, &mut sink, downstream).await?;
            trace!(method = %parts.method, uri = %parts.uri, ?status, "Request answered");

            let (mut parts, body) = sink.into_response().into_parts();
            parts.extensions.insert(status);
            Ok(Response::from_parts(parts, Either::Left(Full::new(body))))
        })
    }
}
