//! Tower middleware integration for the cacheman response cache.
//!
//! This crate provides [`CacheLayer`], a Tower [`Layer`] that serves `GET`
//! responses of configured routes from a [`Backend`] and stores successful
//! ones on a miss. See [`cacheman::CacheManager`] for the full request flow.
//!
//! [`Layer`]: tower::Layer
//! [`Backend`]: cacheman::Backend
//!
//! # Quick Start
//!
//! ```ignore
//! use bytes::Bytes;
//! use cacheman::Config;
//! use cacheman_moka::MokaBackend;
//! use cacheman_tower::CacheLayer;
//! use http_body_util::Full;
//! use tower::{ServiceBuilder, service_fn};
//!
//! let config = Config {
//!     paths: vec!["/articles/:slug".to_owned()],
//!     cache_info_path: Some("/_cache/info".to_owned()),
//!     ..Default::default()
//! };
//! let backend = MokaBackend::builder(10_000).ttl(config.ttl()).build();
//!
//! let service = ServiceBuilder::new()
//!     .layer(CacheLayer::builder().backend(backend).config(config).build()?)
//!     .service(service_fn(|_req| async {
//!         Ok::<_, std::convert::Infallible>(http::Response::new(Full::new(Bytes::from("Hello"))))
//!     }));
//! ```
//!
//! # Responses
//!
//! Requests the cache has nothing to do with (non-`GET`, paths outside the
//! configured routes, disabled middleware) reach the wrapped service directly
//! and its response comes back untouched, body streaming, extensions and
//! trailers included. Cacheable, info and purge requests are buffered. Both
//! kinds share the [`CacheBody`] type. No header is added apart from the
//! configured additional headers on hits. The [`CacheStatus`] of the request
//! is available in the response extensions.
//!
//! # Main Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`CacheLayer`] | Tower `Layer`, the main entry point |
//! | [`CacheBuilder`] | Fluent builder for the layer |
//! | [`service::CacheService`] | The Tower `Service` that performs caching |
//! | [`TowerDownstream`] | Adapter calling a Tower service on behalf of the cache |

#![warn(missing_docs)]

/// Adapter calling Tower services on behalf of the cache.
pub mod downstream;
/// Tower layer and builder.
pub mod layer;
/// The Tower service implementation that performs caching.
pub mod service;

pub use cacheman::{CacheStatus, Config};
pub use downstream::TowerDownstream;
pub use layer::{CacheBuilder, CacheLayer, NotSet};
pub use service::CacheBody;
