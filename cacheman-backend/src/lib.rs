//! Storage capability for the cacheman response cache.
//!
//! If you want to plug in your own key/value store, you are in the right place:
//! implement [`Backend`] and hand it to `cacheman::CacheManager`.
//!
//! ## Built-in Backends
//!
//! | Backend | Crate | Use Case |
//! |---------|-------|----------|
//! | Moka | `cacheman-moka` | In-process, single instance |
//! | Redis | `cacheman-redis` | Remote, shared between instances |

#![warn(missing_docs)]

mod backend;
mod connection;
mod error;

pub use backend::{Backend, BackendResult};
pub use connection::ConnectionConfig;
pub use error::BackendError;

/// Status of deleting result.
#[derive(Debug, PartialEq, Eq)]
pub enum DeleteStatus {
    /// Record successfully deleted.
    Deleted(u32),
    /// Record already missing.
    Missing,
}
