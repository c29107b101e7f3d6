//! Middleware configuration.
//!
//! Keys use camelCase so that the same document can be shared with other
//! deployments of the middleware:
//!
//! ```yaml
//! enabled: true
//! verbose: false
//! ttl: 10m
//! paths: ["/.*"]
//! excludedPaths: ["/admin/:rest"]
//! additionalHeaders:
//!   X-Cache: cacheman
//! cacheInfoPath: /_cache/info
//! purgePath: /_cache
//! purgeMethod: PURGE
//! purgeErrors: swallow
//! connection:
//!   server: 127.0.0.1:6379
//! ```

use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub use cacheman_backend::ConnectionConfig;

/// Entry lifetime used when `ttl` is missing or unparsable.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Method that triggers a purge when none is configured.
pub const DEFAULT_PURGE_METHOD: &str = "PURGE";

/// What a purge request receives when the backend fails to reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurgeErrors {
    /// Log the failure and still answer `200 OK`.
    #[default]
    Swallow,
    /// Answer `500 Internal Server Error` with the failure text.
    Surface,
}

/// Complete middleware configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Master switch. A disabled middleware passes every request through.
    pub enabled: bool,
    /// Log every decision at `info` instead of `trace`.
    pub verbose: bool,
    /// Entry lifetime in humantime notation, e.g. `90s`, `5m`, `1h 30m`.
    pub ttl: String,
    /// Cacheable path patterns.
    pub paths: Vec<String>,
    /// Path patterns that are never cached, checked before `paths`.
    pub excluded_paths: Vec<String>,
    /// Headers set on every cache hit, replacing stored ones of the same name.
    pub additional_headers: IndexMap<String, String>,
    /// Exact path answering with backend information and health.
    pub cache_info_path: Option<String>,
    /// Exact path that resets the backend when requested with `purge_method`.
    pub purge_path: Option<String>,
    /// Method of purge requests.
    pub purge_method: String,
    /// Response to a failed purge.
    pub purge_errors: PurgeErrors,
    /// Remote backend location.
    pub connection: ConnectionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: true,
            verbose: false,
            ttl: humantime::format_duration(DEFAULT_TTL).to_string(),
            paths: Vec::new(),
            excluded_paths: Vec::new(),
            additional_headers: IndexMap::new(),
            cache_info_path: None,
            purge_path: None,
            purge_method: DEFAULT_PURGE_METHOD.to_owned(),
            purge_errors: PurgeErrors::default(),
            connection: ConnectionConfig::default(),
        }
    }
}

impl Config {
    /// Parsed entry lifetime.
    ///
    /// Falls back to [`DEFAULT_TTL`] when the configured value cannot be
    /// parsed or is zero.
    pub fn ttl(&self) -> Duration {
        match humantime::parse_duration(self.ttl.trim()) {
            Ok(ttl) if !ttl.is_zero() => ttl,
            Ok(_) => {
                warn!(ttl = %self.ttl, "Zero TTL, using default");
                DEFAULT_TTL
            }
            Err(error) => {
                warn!(ttl = %self.ttl, %error, "Invalid TTL, using default");
                DEFAULT_TTL
            }
        }
    }

    /// Configured info path, ignoring an empty one.
    pub fn cache_info_path(&self) -> Option<&str> {
        non_empty(self.cache_info_path.as_deref())
    }

    /// Configured purge path, ignoring an empty one.
    pub fn purge_path(&self) -> Option<&str> {
        non_empty(self.purge_path.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}
