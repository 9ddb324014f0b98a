use super::super::cache::{HostCache, ResolverMetrics};
use super::super::lookup::NetworkLookup;
use super::config::ResolverConfig;
use async_trait::async_trait;
use dnscached_application::ports::{
    CacheRefreshOutcome, CacheStore, HostLookup, HostResolver, MetricsSnapshot,
};
use dnscached_domain::{CacheEntry, DomainError};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Cache-first resolver: answers from the store while entries are fresh and
/// falls back to upstream lookups, writing successes back.
pub struct CachingResolver {
    lookup: Arc<dyn HostLookup>,
    cache: Arc<dyn CacheStore>,
    metrics: Arc<ResolverMetrics>,
    config: ResolverConfig,
    shutdown: CancellationToken,
}

enum RefreshResult {
    Refreshed,
    Evicted,
    Failed,
    Interrupted,
}

impl CachingResolver {
    /// Resolver over the network lookup (system resolver) with a fresh cache.
    pub fn new(refresh_interval: Duration) -> Self {
        let config = ResolverConfig::default().with_refresh_interval(refresh_interval);
        Self::from_parts(
            Arc::new(NetworkLookup::new(config.query_timeout)),
            Arc::new(HostCache::with_capacity(config.cache_capacity)),
            Arc::new(ResolverMetrics::new()),
            config,
            CancellationToken::new(),
        )
    }

    pub(super) fn from_parts(
        lookup: Arc<dyn HostLookup>,
        cache: Arc<dyn CacheStore>,
        metrics: Arc<ResolverMetrics>,
        config: ResolverConfig,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            lookup,
            cache,
            metrics,
            config,
            shutdown,
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<dyn CacheStore> {
        &self.cache
    }

    pub fn metrics_handle(&self) -> &Arc<ResolverMetrics> {
        &self.metrics
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Token observed by in-flight lookups. Background jobs and the protocol
    /// server derive child tokens from it so `close()` stops everything.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn close(&self) {
        if !self.shutdown.is_cancelled() {
            info!("Closing resolver");
        }
        self.shutdown.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    pub async fn fetch(&self, hostname: &str) -> Result<Arc<[IpAddr]>, DomainError> {
        self.metrics.record_lookup();

        if let Some(entry) = self.cache.get_entry(hostname) {
            if !entry.is_expired() {
                self.metrics.record_hit();
                debug!(hostname, "Cache HIT");
                return Ok(entry.ips);
            }
        }

        self.metrics.record_miss();
        debug!(hostname, "Cache MISS");
        self.lookup(hostname).await
    }

    pub async fn fetch_one(&self, hostname: &str) -> Result<IpAddr, DomainError> {
        let ips = self.fetch(hostname).await?;
        ips.first()
            .copied()
            .ok_or_else(|| no_addresses(hostname))
    }

    pub async fn fetch_one_string(&self, hostname: &str) -> Result<String, DomainError> {
        self.fetch_one(hostname).await.map(|ip| ip.to_string())
    }

    /// Uniformly picks one address. Not suitable where unpredictability matters.
    pub async fn fetch_random(&self, hostname: &str) -> Result<IpAddr, DomainError> {
        let ips = self.fetch(hostname).await?;
        if ips.is_empty() {
            return Err(no_addresses(hostname));
        }
        Ok(ips[fastrand::usize(..ips.len())])
    }

    pub async fn fetch_random_string(&self, hostname: &str) -> Result<String, DomainError> {
        self.fetch_random(hostname).await.map(|ip| ip.to_string())
    }

    /// Resolves upstream regardless of the cache and writes a success back.
    pub async fn lookup(&self, hostname: &str) -> Result<Arc<[IpAddr]>, DomainError> {
        let result = tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => return Err(DomainError::Cancelled),
            result = self.lookup_with_retries(hostname) => result,
        };

        match result {
            Ok(ips) => {
                self.cache
                    .create(hostname, Arc::clone(&ips), self.config.default_ttl);
                debug!(hostname, addresses = ips.len(), "Resolved and cached");
                Ok(ips)
            }
            Err(e) => {
                self.metrics.record_error();
                debug!(hostname, error = %e, "Resolution failed");
                Err(e)
            }
        }
    }

    async fn lookup_with_retries(&self, hostname: &str) -> Result<Arc<[IpAddr]>, DomainError> {
        let targets: Vec<Option<SocketAddr>> = match &self.config.upstream_servers {
            None => vec![None],
            Some(servers) => servers.iter().copied().map(Some).collect(),
        };

        let attempts = self.config.max_retries.max(1);
        let mut last_error: Option<DomainError> = None;

        for server in targets {
            for attempt in 1..=attempts {
                match self.attempt(hostname, server).await {
                    Ok(ips) => return Ok(ips.into()),
                    Err(DomainError::NxDomain) => return Err(DomainError::NxDomain),
                    Err(e) => {
                        let transient = e.is_transient();
                        debug!(
                            hostname,
                            server = ?server,
                            attempt,
                            error = %e,
                            "Lookup attempt failed"
                        );
                        last_error = Some(e);

                        if !transient || attempt == attempts {
                            break;
                        }
                        self.metrics.record_retry();
                    }
                }
            }
        }

        Err(DomainError::ResolutionFailed {
            hostname: hostname.to_string(),
            reason: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no usable upstream server".to_string()),
        })
    }

    async fn attempt(
        &self,
        hostname: &str,
        server: Option<SocketAddr>,
    ) -> Result<Vec<IpAddr>, DomainError> {
        let ips = tokio::time::timeout(
            self.config.query_timeout,
            self.lookup.lookup_ip(hostname, server),
        )
        .await
        .map_err(|_| DomainError::QueryTimeout)??;

        if ips.is_empty() {
            return Err(no_addresses(hostname));
        }
        Ok(ips)
    }

    /// Runs one refresh cycle bounded by the configured cycle deadline.
    pub async fn refresh(&self) -> CacheRefreshOutcome {
        let deadline = self
            .config
            .cycle_timeout()
            .map(|timeout| Instant::now() + timeout);
        self.refresh_until(deadline).await
    }

    /// Re-resolves every cached hostname. A name the upstream reports as
    /// nonexistent is removed; transient failures leave the entry alone.
    /// Hosts not reached before `deadline` or cancellation are skipped.
    pub async fn refresh_until(&self, deadline: Option<Instant>) -> CacheRefreshOutcome {
        let hostnames = self.cache.hostnames();
        let mut outcome = CacheRefreshOutcome {
            candidates_found: hostnames.len(),
            ..Default::default()
        };

        let mut pacer = RefreshPacer::new(self.config.refresh_rate_limit);

        for (index, hostname) in hostnames.iter().enumerate() {
            if self.shutdown.is_cancelled() || deadline.is_some_and(|d| Instant::now() >= d) {
                outcome.skipped = hostnames.len() - index;
                break;
            }

            match self.refresh_host(hostname, &mut pacer, deadline).await {
                RefreshResult::Refreshed => outcome.refreshed += 1,
                RefreshResult::Evicted => outcome.evicted += 1,
                RefreshResult::Failed => outcome.failed += 1,
                RefreshResult::Interrupted => {
                    outcome.skipped = hostnames.len() - index;
                    break;
                }
            }
        }

        outcome.cache_size = self.cache.len();

        if outcome.skipped > 0 {
            warn!(
                skipped = outcome.skipped,
                candidates = outcome.candidates_found,
                "Refresh cycle stopped before visiting every host"
            );
        }
        outcome
    }

    async fn refresh_host(
        &self,
        hostname: &str,
        pacer: &mut RefreshPacer,
        deadline: Option<Instant>,
    ) -> RefreshResult {
        let attempts = self.config.refresh_attempts.max(1);

        for attempt in 1..=attempts {
            let paced = async {
                pacer.wait().await;
                self.lookup(hostname).await
            };

            let result = match deadline {
                Some(deadline) => match tokio::time::timeout_at(deadline, paced).await {
                    Ok(result) => result,
                    Err(_) => return RefreshResult::Interrupted,
                },
                None => paced.await,
            };

            match result {
                Ok(_) => return RefreshResult::Refreshed,
                Err(DomainError::NxDomain) => {
                    self.cache.delete(hostname);
                    info!(hostname, "Evicted hostname that no longer exists");
                    return RefreshResult::Evicted;
                }
                Err(DomainError::Cancelled) => return RefreshResult::Interrupted,
                Err(e) => {
                    debug!(hostname, attempt, error = %e, "Refresh attempt failed");
                }
            }
        }

        RefreshResult::Failed
    }

    pub fn create(&self, hostname: &str, ips: Arc<[IpAddr]>, ttl: Duration) {
        self.cache.create(hostname, ips, ttl);
    }

    pub fn get(&self, hostname: &str) -> Option<CacheEntry> {
        self.cache.get_entry(hostname)
    }

    pub fn delete(&self, hostname: &str) -> bool {
        self.cache.delete(hostname)
    }

    pub fn exists(&self, hostname: &str) -> bool {
        self.cache.exists(hostname)
    }

    pub fn range(&self) -> impl Iterator<Item = String> {
        self.cache.hostnames().into_iter()
    }
}

#[async_trait]
impl HostResolver for CachingResolver {
    async fn fetch(&self, hostname: &str) -> Result<Arc<[IpAddr]>, DomainError> {
        CachingResolver::fetch(self, hostname).await
    }
}

fn no_addresses(hostname: &str) -> DomainError {
    DomainError::ResolutionFailed {
        hostname: hostname.to_string(),
        reason: "no address records".to_string(),
    }
}

/// Spaces refresh lookups across a whole cycle. A zero spacing disables it.
struct RefreshPacer {
    interval: Option<Interval>,
}

impl RefreshPacer {
    fn new(spacing: Duration) -> Self {
        let interval = (!spacing.is_zero()).then(|| {
            let mut interval = tokio::time::interval(spacing);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });
        Self { interval }
    }

    async fn wait(&mut self) {
        if let Some(interval) = self.interval.as_mut() {
            interval.tick().await;
        }
    }
}
