use super::super::cache::{HostCache, ResolverMetrics};
use super::cache_layer::CachingResolver;
use super::config::ResolverConfig;
use dnscached_application::ports::{CacheStore, HostLookup};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub struct ResolverBuilder {
    lookup: Arc<dyn HostLookup>,
    config: ResolverConfig,
    cache: Option<Arc<dyn CacheStore>>,
    metrics: Option<Arc<ResolverMetrics>>,
}

impl ResolverBuilder {
    pub fn new(lookup: Arc<dyn HostLookup>) -> Self {
        Self {
            lookup,
            config: ResolverConfig::default(),
            cache: None,
            metrics: None,
        }
    }

    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_cache(mut self, cache: Arc<dyn CacheStore>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<ResolverMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn build(self) -> Arc<CachingResolver> {
        let upstreams = self
            .config
            .upstream_servers
            .as_ref()
            .map(|servers| servers.len());

        info!(
            upstreams = ?upstreams,
            max_retries = self.config.max_retries,
            default_ttl_secs = self.config.default_ttl.as_secs(),
            refresh_interval_secs = self.config.refresh_interval.as_secs(),
            "Building caching resolver"
        );

        let cache = self.cache.unwrap_or_else(|| {
            Arc::new(HostCache::with_capacity(self.config.cache_capacity)) as Arc<dyn CacheStore>
        });
        let metrics = self.metrics.unwrap_or_default();

        Arc::new(CachingResolver::from_parts(
            self.lookup,
            cache,
            metrics,
            self.config,
            CancellationToken::new(),
        ))
    }
}
