//! Backend re-exports.
//!
//! | Backend | Crate | Use Case |
//! |---------|-------|----------|
//! | Moka | [`cacheman-moka`] | In-process, single instance |
//! | Redis | [`cacheman-redis`] | Remote, shared between instances |
//!
//! [`cacheman-moka`]: https://docs.rs/cacheman-moka
//! [`cacheman-redis`]: https://docs.rs/cacheman-redis

pub use cacheman_backend::{
    Backend, BackendError, BackendResult, ConnectionConfig, DeleteStatus,
};
