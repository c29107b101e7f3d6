//! In-process cache backend for cacheman using [Moka](https://docs.rs/moka).
#![warn(missing_docs)]

mod backend;
mod builder;

pub use backend::MokaBackend;
pub use builder::{DEFAULT_TTL, MokaBackendBuilder};
pub use moka::policy::EvictionPolicy;
