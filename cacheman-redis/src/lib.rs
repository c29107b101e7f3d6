//! Remote key/value backend for cacheman built on [redis-rs](https://docs.rs/redis).
//!
//! ```no_run
//! use std::time::Duration;
//! use cacheman_redis::RedisBackend;
//!
//! let backend = RedisBackend::builder()
//!     .server("127.0.0.1:6379")
//!     .database(2)
//!     .prefix("cacheman:")
//!     .ttl(Duration::from_secs(300))
//!     .build()?;
//! # Ok::<(), cacheman_redis::error::Error>(())
//! ```
#![warn(missing_docs)]

pub mod backend;
pub mod error;

#[doc(inline)]
pub use crate::backend::{DEFAULT_TTL, RedisBackend, RedisBackendBuilder};
