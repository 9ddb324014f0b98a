use async_trait::async_trait;
use dnscached_domain::DomainError;

/// Outcome of a cache refresh cycle.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheRefreshOutcome {
    pub candidates_found: usize,
    pub refreshed: usize,
    /// Hostnames removed after an authoritative NXDOMAIN.
    pub evicted: usize,
    pub failed: usize,
    /// Hostnames left untouched because the cycle deadline passed.
    pub skipped: usize,
    pub cache_size: usize,
}

/// Outcome of an expiry sweep.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheExpireOutcome {
    pub entries_removed: usize,
    pub cache_size: usize,
}

/// Port for cache maintenance operations (refresh + expiry).
#[async_trait]
pub trait CacheMaintenancePort: Send + Sync {
    /// Re-resolve every cached hostname, evicting names that no longer exist.
    async fn run_refresh_cycle(&self) -> Result<CacheRefreshOutcome, DomainError>;

    /// Remove entries whose TTL has elapsed. No network I/O.
    async fn run_expire_cycle(&self) -> Result<CacheExpireOutcome, DomainError>;
}
