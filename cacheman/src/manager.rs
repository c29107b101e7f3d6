//! Request orchestration: hit, miss and store, purge and info.

use async_trait::async_trait;
use bytes::Bytes;
use cacheman_backend::{Backend, BackendResult};
use http::header::CONTENT_TYPE;
use http::request::Parts;
use http::{HeaderName, HeaderValue, Method, StatusCode};
use tracing::warn;

use crate::codec;
use crate::config::{Config, PurgeErrors};
use crate::error::ConfigError;
use crate::health::{self, CacheInfo, HealthCheckResult};
use crate::interceptor::Interceptor;
use crate::matcher::RouteMatcher;
use crate::sink::ResponseSink;

macro_rules! verbose {
    ($manager:expr, $($arg:tt)+) => {
        if $manager.verbose {
            tracing::info!($($arg)+)
        } else {
            tracing::trace!($($arg)+)
        }
    };
}

/// How a request was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Served from the backend, downstream not called.
    Hit,
    /// Downstream called on a cacheable path.
    Miss,
    /// Downstream called, caching not applicable.
    Bypass,
    /// Info document served.
    Info,
    /// Backend reset on request.
    Purged,
}

/// What the middleware does with a request, known before the handler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Call the handler and leave its response alone.
    Bypass,
    /// Answer with the info document.
    Info,
    /// Reset the backend.
    Purge,
    /// Serve from cache or call the handler and store.
    Cache,
}

/// The handler behind the middleware.
///
/// Called at most once per request, with the sink it must write its
/// response to.
#[async_trait]
pub trait Downstream: Send {
    /// Handler failure, passed through untouched.
    type Error: Send;

    /// Produce the response.
    async fn run(self, sink: &mut dyn ResponseSink) -> Result<(), Self::Error>;
}

/// Caches successful `GET` responses of configured routes in a [`Backend`].
///
/// # Request flow
///
/// The first five rows are settled by [`CacheManager::decide`] alone.
///
/// | Request | Result |
/// |---------|--------|
/// | middleware disabled | [`CacheStatus::Bypass`] |
/// | `purge_method` on the purge path | [`CacheStatus::Purged`] |
/// | any other non-`GET` | [`CacheStatus::Bypass`] |
/// | `GET` on the info path | [`CacheStatus::Info`] |
/// | `GET` on a non-cacheable path | [`CacheStatus::Bypass`] |
/// | `GET` with a decodable entry | [`CacheStatus::Hit`] |
/// | any other `GET` | [`CacheStatus::Miss`], stored if the status is `200` |
///
/// Entries are keyed by the request target, path and query together.
/// Backend failures never fail a request: reads count as misses, writes are
/// logged and dropped.
#[derive(Debug)]
pub struct CacheManager<B> {
    backend: B,
    enabled: bool,
    verbose: bool,
    routes: RouteMatcher,
    additional_headers: Vec<(HeaderName, HeaderValue)>,
    cache_info_path: Option<String>,
    purge_path: Option<String>,
    purge_method: Method,
    purge_errors: PurgeErrors,
}

impl<B> CacheManager<B>
where
    B: Backend,
{
    /// Validate the configuration and bind it to a backend.
    pub fn new(config: &Config, backend: B) -> Result<Self, ConfigError> {
        let routes = RouteMatcher::new(&config.paths, &config.excluded_paths)?;
        let additional_headers = config
            .additional_headers
            .iter()
            .map(|(name, value)| {
                let invalid = || ConfigError::InvalidHeader { name: name.clone() };
                let header_name =
                    HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
                let header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;
                Ok((header_name, header_value))
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        let purge_method = Method::from_bytes(config.purge_method.as_bytes())
            .map_err(|_| ConfigError::InvalidMethod(config.purge_method.clone()))?;

        Ok(Self {
            backend,
            enabled: config.enabled,
            verbose: config.verbose,
            routes,
            additional_headers,
            cache_info_path: config.cache_info_path().map(str::to_owned),
            purge_path: config.purge_path().map(str::to_owned),
            purge_method,
            purge_errors: config.purge_errors,
        })
    }

    /// Wrapped backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Whether the middleware does anything at all.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether responses for this path may be cached.
    pub fn is_cacheable(&self, path: &str) -> bool {
        self.routes.is_cacheable(path)
    }

    /// Read an entry. Absent entries and backend failures are both misses.
    pub async fn lookup(&self, key: &str) -> Option<Bytes> {
        match self.backend.get(key).await {
            Ok(Some(value)) => {
                verbose!(self, %key, "Cache hits");
                Some(value)
            }
            Ok(None) => {
                verbose!(self, %key, "Cache misses");
                None
            }
            Err(error) => {
                verbose!(self, %key, %error, "Cache misses");
                None
            }
        }
    }

    /// Write an entry.
    pub async fn store(&self, key: &str, value: Bytes) -> BackendResult<()> {
        verbose!(self, %key, "Cache sets");
        self.backend.set(key, value).await
    }

    /// Drop every entry.
    pub async fn purge(&self) -> BackendResult<()> {
        verbose!(self, "Cache purge");
        self.backend.reset().await
    }

    /// Probe the backend. See [`health::health_check`].
    pub async fn health_check(&self) -> HealthCheckResult {
        health::health_check(&self.backend).await
    }

    /// Backend type together with a fresh probe result.
    pub async fn cache_info(&self) -> CacheInfo {
        CacheInfo {
            backend_type: self.backend.type_name().to_owned(),
            operation_health: self.health_check().await,
        }
    }

    /// Replay a stored response into `sink`.
    ///
    /// Returns `false`, leaving the sink untouched, when there is no entry or
    /// it cannot be decoded. Stored headers replace same-named headers already
    /// on the sink, then additional headers replace stored ones.
    pub async fn try_serve_from_cache(&self, key: &str, sink: &mut dyn ResponseSink) -> bool {
        let Some(data) = self.lookup(key).await else {
            return false;
        };
        let cached = match codec::decode(&data) {
            Ok(cached) => cached,
            Err(error) => {
                warn!(%key, %error, "Discarding undecodable cache entry");
                return false;
            }
        };

        let headers = sink.headers_mut();
        for name in cached.headers.keys() {
            headers.remove(name);
        }
        for (name, value) in &cached.headers {
            headers.append(name.clone(), value.clone());
        }
        for (name, value) in &self.additional_headers {
            headers.insert(name.clone(), value.clone());
        }

        sink.commit(cached.status);
        if !cached.body.is_empty() {
            if let Err(error) = sink.write(&cached.body) {
                warn!(%key, %error, "Failed to write cached body");
            }
        }
        true
    }

    /// Classify a request without touching the backend.
    ///
    /// Adapters use this to hand [`Disposition::Bypass`] traffic to the
    /// handler directly, keeping streamed bodies streamed.
    pub fn decide(&self, request: &Parts) -> Disposition {
        if !self.enabled {
            return Disposition::Bypass;
        }

        let path = request.uri.path();
        verbose!(self, target = %cache_key(request), "Test path");

        if request.method != Method::GET {
            if request.method == self.purge_method
                && matches_exact(self.purge_path.as_deref(), path)
            {
                return Disposition::Purge;
            }
            verbose!(self, method = %request.method, "Method does not match");
            return Disposition::Bypass;
        }

        if matches_exact(self.cache_info_path.as_deref(), path) {
            verbose!(self, "Cache info request");
            return Disposition::Info;
        }

        if !self.routes.is_cacheable(path) {
            verbose!(self, target = %cache_key(request), "Path does not match");
            return Disposition::Bypass;
        }
        verbose!(self, target = %cache_key(request), "Path matches");
        Disposition::Cache
    }

    /// Answer one request, calling `downstream` only when needed.
    ///
    /// A downstream error is returned as is and nothing is stored.
    pub async fn handle<D>(
        &self,
        request: &Parts,
        sink: &mut dyn ResponseSink,
        downstream: D,
    ) -> Result<CacheStatus, D::Error>
    where
        D: Downstream,
    {
        match self.decide(request) {
            Disposition::Bypass => {
                downstream.run(sink).await?;
                Ok(CacheStatus::Bypass)
            }
            Disposition::Purge => {
                self.respond_purge(sink).await;
                Ok(CacheStatus::Purged)
            }
            Disposition::Info => {
                self.respond_info(sink).await;
                Ok(CacheStatus::Info)
            }
            Disposition::Cache => {
                self.handle_cacheable(cache_key(request), sink, downstream)
                    .await
            }
        }
    }

    async fn handle_cacheable<D>(
        &self,
        key: &str,
        sink: &mut dyn ResponseSink,
        downstream: D,
    ) -> Result<CacheStatus, D::Error>
    where
        D: Downstream,
    {
        if self.try_serve_from_cache(key, sink).await {
            return Ok(CacheStatus::Hit);
        }

        let mut interceptor = Interceptor::new(&mut *sink);
        downstream.run(&mut interceptor).await?;

        if interceptor.is_failed() {
            warn!(%key, "Client write failed, response not stored");
            return Ok(CacheStatus::Miss);
        }
        match interceptor.into_captured() {
            Some(captured) if captured.status == StatusCode::OK => {
                match codec::encode(&captured) {
                    Ok(value) => {
                        if let Err(error) = self.store(key, value).await {
                            warn!(%key, %error, "Failed to store response");
                        }
                    }
                    Err(error) => warn!(%key, %error, "Failed to encode response"),
                }
            }
            captured => {
                verbose!(
                    self,
                    %key,
                    status = ?captured.map(|captured| captured.status),
                    "Response not stored"
                );
            }
        }
        Ok(CacheStatus::Miss)
    }

    async fn respond_purge(&self, sink: &mut dyn ResponseSink) {
        match self.purge().await {
            Ok(()) => sink.commit(StatusCode::OK),
            Err(error) => {
                warn!(%error, "Purge failed");
                match self.purge_errors {
                    PurgeErrors::Swallow => sink.commit(StatusCode::OK),
                    PurgeErrors::Surface => {
                        respond_text(sink, StatusCode::INTERNAL_SERVER_ERROR, &error.to_string())
                    }
                }
            }
        }
    }

    async fn respond_info(&self, sink: &mut dyn ResponseSink) {
        let info = self.cache_info().await;
        match serde_json::to_vec(&info) {
            Ok(body) => {
                sink.headers_mut().insert(
                    CONTENT_TYPE,
                    HeaderValue::from_static("application/json; charset=UTF-8"),
                );
                sink.commit(StatusCode::OK);
                if let Err(error) = sink.write(&body) {
                    warn!(%error, "Failed to write cache info");
                }
            }
            Err(error) => {
                warn!(%error, "Failed to serialize cache info");
                sink.commit(StatusCode::INTERNAL_SERVER_ERROR);
            }
        }
    }
}

/// Request target, path and query together.
fn cache_key(request: &Parts) -> &str {
    request
        .uri
        .path_and_query()
        .map_or(request.uri.path(), |target| target.as_str())
}

fn matches_exact(expected: Option<&str>, path: &str) -> bool {
    expected == Some(path)
}

fn respond_text(sink: &mut dyn ResponseSink, status: StatusCode, text: &str) {
    sink.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    sink.commit(status);
    if let Err(error) = sink.write(text.as_bytes()) {
        warn!(%error, "Failed to write response body");
    }
}
