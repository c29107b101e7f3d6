//! Builder for configuring [`MokaBackend`].

use std::time::Duration;

use bytes::Bytes;
use moka::future::{Cache, CacheBuilder};
use moka::policy::EvictionPolicy;

use crate::backend::MokaBackend;

/// Default entry lifetime when none is configured.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Builder for creating and configuring a [`MokaBackend`].
///
/// Use [`MokaBackend::builder`] to create a new builder instance.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use cacheman_moka::{EvictionPolicy, MokaBackend};
///
/// let backend = MokaBackend::builder(1_000)
///     .label("pages")
///     .ttl(Duration::from_secs(30))
///     .eviction_policy(EvictionPolicy::lru())
///     .build();
/// ```
pub struct MokaBackendBuilder {
    max_capacity: u64,
    ttl: Duration,
    label: String,
    eviction_policy: Option<EvictionPolicy>,
}

impl MokaBackendBuilder {
    /// Creates a new builder holding at most `max_capacity` entries.
    pub fn new(max_capacity: u64) -> Self {
        Self {
            max_capacity,
            ttl: DEFAULT_TTL,
            label: "moka".to_owned(),
            eviction_policy: None,
        }
    }

    /// Sets the label reported as the backend type.
    ///
    /// # Default
    ///
    /// `"moka"`
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets how long every entry stays readable after it was written.
    ///
    /// # Default
    ///
    /// Five minutes.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Sets the eviction policy for the cache.
    ///
    /// # Default
    ///
    /// [`EvictionPolicy::tiny_lfu()`]
    pub fn eviction_policy(mut self, policy: EvictionPolicy) -> Self {
        self.eviction_policy = Some(policy);
        self
    }

    /// Builds the [`MokaBackend`].
    pub fn build(self) -> MokaBackend {
        let policy = self
            .eviction_policy
            .unwrap_or_else(EvictionPolicy::tiny_lfu);
        let cache: Cache<String, Bytes> = CacheBuilder::new(self.max_capacity)
            .eviction_policy(policy)
            .time_to_live(self.ttl)
            .build();

        MokaBackend {
            cache,
            label: self.label,
        }
    }
}
