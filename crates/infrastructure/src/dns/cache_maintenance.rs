use super::resolver::CachingResolver;
use async_trait::async_trait;
use dnscached_application::ports::{
    CacheExpireOutcome, CacheMaintenancePort, CacheRefreshOutcome,
};
use dnscached_domain::DomainError;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Infrastructure adapter implementing `CacheMaintenancePort`.
pub struct DnsCacheMaintenance {
    resolver: Arc<CachingResolver>,
}

impl DnsCacheMaintenance {
    pub fn new(resolver: Arc<CachingResolver>) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl CacheMaintenancePort for DnsCacheMaintenance {
    async fn run_refresh_cycle(&self) -> Result<CacheRefreshOutcome, DomainError> {
        if self.resolver.is_closed() {
            return Err(DomainError::Cancelled);
        }

        let outcome = self.resolver.refresh().await;
        debug!(
            candidates = outcome.candidates_found,
            refreshed = outcome.refreshed,
            evicted = outcome.evicted,
            "Refresh cycle finished"
        );
        Ok(outcome)
    }

    async fn run_expire_cycle(&self) -> Result<CacheExpireOutcome, DomainError> {
        let cache = self.resolver.cache();
        let removed = cache.remove_expired_at(Instant::now());

        Ok(CacheExpireOutcome {
            entries_removed: removed,
            cache_size: cache.len(),
        })
    }
}
