#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

/// Storage capability and the built-in backends.
pub mod backend;

/// Wire format of stored responses.
pub mod codec;

/// Middleware configuration and its defaults.
pub mod config;

/// Error types for configuration and stored entries.
pub mod error;

/// Backend self-test and the info document.
pub mod health;

/// Response capture between a handler and the client.
pub mod interceptor;

/// Request orchestration.
///
/// [`CacheManager`](manager::CacheManager) decides per request whether to
/// serve from cache, call the handler and store, purge, or answer the info
/// path.
pub mod manager;

/// Path patterns.
pub mod matcher;

/// Response destinations.
pub mod sink;

pub use backend::{Backend, BackendError, DeleteStatus};
pub use config::{Config, PurgeErrors};
pub use error::{CodecError, ConfigError};
pub use health::{CacheInfo, HealthCheckResult, HealthStatus};
pub use interceptor::{CapturedResponse, Interceptor, InterceptorState};
pub use manager::{CacheManager, CacheStatus, Disposition, Downstream};
pub use matcher::{Route, RouteMatcher};
pub use sink::{BufferedResponse, ResponseSink};
