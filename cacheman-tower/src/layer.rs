use std::sync::Arc;

use cacheman::{Backend, CacheManager, Config, ConfigError};
use tower::Layer;

use crate::service::CacheService;

/// Tower [`Layer`] adding response caching to a service.
///
/// Every service produced by the layer shares the same [`CacheManager`].
pub struct CacheLayer<B> {
    manager: Arc<CacheManager<B>>,
}

impl<B> CacheLayer<B> {
    /// Layer around an existing manager.
    pub fn new(manager: Arc<CacheManager<B>>) -> Self {
        CacheLayer { manager }
    }

    /// Shared manager.
    pub fn manager(&self) -> &Arc<CacheManager<B>> {
        &self.manager
    }
}

impl CacheLayer<NotSet> {
    /// Start configuring a layer.
    pub fn builder() -> CacheBuilder<NotSet> {
        CacheBuilder::default()
    }
}

impl<B> Clone for CacheLayer<B> {
    fn clone(&self) -> Self {
        Self {
            manager: Arc::clone(&self.manager),
        }
    }
}

impl<S, B> Layer<S> for CacheLayer<B> {
    type Service = CacheService<S, B>;

    fn layer(&self, upstream: S) -> Self::Service {
        CacheService::new(upstream, Arc::clone(&self.manager))
    }
}

/// Marker for a builder without a backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotSet;

/// Fluent builder for [`CacheLayer`].
///
/// [`build`](CacheBuilder::build) is only available once a backend is set.
///
/// | Method | Default |
/// |--------|---------|
/// | [`backend`](CacheBuilder::backend) | required |
/// | [`config`](CacheBuilder::config) | [`Config::default`] |
pub struct CacheBuilder<B> {
    backend: B,
    config: Config,
}

impl Default for CacheBuilder<NotSet> {
    fn default() -> Self {
        Self {
            backend: NotSet,
            config: Config::default(),
        }
    }
}

impl<B> CacheBuilder<B> {
    /// Storage for cached responses.
    pub fn backend<NB: Backend>(self, backend: NB) -> CacheBuilder<NB> {
        CacheBuilder {
            backend,
            config: self.config,
        }
    }

    /// Middleware configuration.
    pub fn config(self, config: Config) -> Self {
        CacheBuilder { config, ..self }
    }
}

impl<B> CacheBuilder<B>
where
    B: Backend,
{
    /// Validate the configuration and create the layer.
    pub fn build(self) -> Result<CacheLayer<B>, ConfigError> {
        let manager = CacheManager::new(&self.config, self.backend)?;
        Ok(CacheLayer::new(Arc::new(manager)))
    }
}
