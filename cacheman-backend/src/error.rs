//! Error types for backend operations.

use thiserror::Error;

/// Error type for backend operations.
///
/// The orchestrator never turns these into a failed request: a read error is a
/// cache miss and a write error is logged and dropped.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Internal backend error, state or computation error.
    ///
    /// Any error not related to network interaction.
    #[error(transparent)]
    InternalError(Box<dyn std::error::Error + Send + Sync>),

    /// Network interaction error.
    ///
    /// Errors occurring during communication with remote backends (e.g., Redis).
    #[error(transparent)]
    ConnectionError(Box<dyn std::error::Error + Send + Sync>),
}

impl BackendError {
    /// Wraps any error as an [`InternalError`](BackendError::InternalError).
    pub fn internal<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::InternalError(Box::new(error))
    }

    /// Wraps any error as a [`ConnectionError`](BackendError::ConnectionError).
    pub fn connection<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ConnectionError(Box::new(error))
    }
}
