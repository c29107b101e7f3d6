use thiserror::Error;

/// Rejected configuration.
///
/// Returned by [`CacheManager::new`](crate::CacheManager::new) and
/// [`RouteMatcher::new`](crate::RouteMatcher::new). Nothing is served until
/// the configuration is fixed.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A path pattern did not compile into a regular expression.
    #[error("invalid route pattern {pattern:?}: {source}")]
    InvalidRoute {
        /// Pattern as it was configured.
        pattern: String,
        /// Compilation failure.
        #[source]
        source: regex::Error,
    },

    /// An additional header has a name or value that is not valid HTTP.
    #[error("invalid additional header {name:?}")]
    InvalidHeader {
        /// Header name as it was configured.
        name: String,
    },

    /// The purge method is not a valid HTTP method token.
    #[error("invalid purge method {0:?}")]
    InvalidMethod(String),
}

/// Failure turning a captured response into cache bytes or back.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The entry is not the expected JSON document.
    #[error("malformed cache entry: {0}")]
    Json(#[from] serde_json::Error),

    /// The body is not valid base64.
    #[error("malformed cache entry content: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The stored status is outside the HTTP range.
    #[error("invalid status code {0} in cache entry")]
    Status(u16),

    /// A stored header name is not valid HTTP.
    #[error("invalid header name {0:?} in cache entry")]
    HeaderName(String),

    /// A stored header value is not valid HTTP.
    #[error("invalid value for header {0:?} in cache entry")]
    HeaderValue(String),
}
