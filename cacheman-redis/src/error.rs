//! Error types for Redis backend operations.
//!
//! All errors convert into [`BackendError`] so the orchestrator can treat
//! every backend uniformly.
//!
//! [`BackendError`]: cacheman_backend::BackendError

use cacheman_backend::BackendError;
use redis::RedisError;

/// Error type for Redis backend operations.
///
/// # When You'll Encounter This
///
/// - Using [`RedisBackendBuilder::build`] with a server address that does not
///   form a valid connection URL
/// - Performing the first cache operation when Redis is unreachable
///   (connection is established lazily)
/// - Performing cache operations when the Redis server returns an error
///
/// [`RedisBackendBuilder::build`]: crate::RedisBackendBuilder::build
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An error from the underlying Redis client.
    ///
    /// This includes connection failures, protocol errors, authentication
    /// failures, and command execution errors.
    #[error("Redis backend error: {0}")]
    Redis(#[from] RedisError),

    /// The server address could not be turned into a connection URL.
    #[error("Invalid Redis server address {server:?}: {source}")]
    InvalidServer {
        /// Address as it was configured.
        server: String,
        /// Underlying parse failure.
        source: url::ParseError,
    },

    /// The password cannot be attached to the server URL.
    #[error("Redis server address {0:?} cannot carry credentials")]
    CredentialsNotSupported(String),
}

impl From<Error> for BackendError {
    fn from(error: Error) -> Self {
        if matches!(&error, Error::Redis(e) if e.is_io_error()) {
            Self::ConnectionError(Box::new(error))
        } else {
            Self::InternalError(Box::new(error))
        }
    }
}
