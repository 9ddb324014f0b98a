use dnscached_application::ports::CacheMaintenancePort;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(300);
const DEFAULT_EXPIRE_INTERVAL: Duration = Duration::from_secs(60);

/// Drives the refresh and expire cycles on independent intervals.
///
/// Both loops stop when the shared token is cancelled; each can also be
/// stopped on its own through `stop_refresh` / `stop_expire`.
pub struct CacheMaintenanceJob {
    maintenance: Arc<dyn CacheMaintenancePort>,
    refresh_interval: Duration,
    expire_interval: Duration,
    shutdown: CancellationToken,
    refresh_stop: CancellationToken,
    expire_stop: CancellationToken,
}

impl CacheMaintenanceJob {
    pub fn new(maintenance: Arc<dyn CacheMaintenancePort>) -> Self {
        let shutdown = CancellationToken::new();
        Self {
            maintenance,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            expire_interval: DEFAULT_EXPIRE_INTERVAL,
            refresh_stop: shutdown.child_token(),
            expire_stop: shutdown.child_token(),
            shutdown,
        }
    }

    pub fn with_intervals(mut self, refresh: Duration, expire: Duration) -> Self {
        self.refresh_interval = refresh;
        self.expire_interval = expire;
        self
    }

    /// A zero interval disables the refresh loop.
    pub fn with_refresh_interval(mut self, refresh: Duration) -> Self {
        self.refresh_interval = refresh;
        self
    }

    pub fn with_expire_interval(mut self, expire: Duration) -> Self {
        self.expire_interval = expire;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.refresh_stop = token.child_token();
        self.expire_stop = token.child_token();
        self.shutdown = token;
        self
    }

    pub fn stop_refresh(&self) {
        self.refresh_stop.cancel();
    }

    pub fn stop_expire(&self) {
        self.expire_stop.cancel();
    }

    pub fn stop(&self) {
        self.shutdown.cancel();
    }

    /// Spawns the loops and returns their handles. The first cycle of each
    /// loop runs one full interval after start.
    pub async fn start(self: Arc<Self>) -> Vec<JoinHandle<()>> {
        info!(
            refresh_interval_secs = self.refresh_interval.as_secs(),
            expire_interval_secs = self.expire_interval.as_secs(),
            "Starting cache maintenance background jobs"
        );

        let mut handles = Vec::with_capacity(2);

        if self.refresh_interval.is_zero() {
            info!("Background refresh disabled");
        } else {
            let refresh_job = Arc::clone(&self);
            handles.push(tokio::spawn(async move { refresh_job.refresh_loop().await }));
        }

        if self.expire_interval.is_zero() {
            info!("Background expiry disabled");
        } else {
            let expire_job = Arc::clone(&self);
            handles.push(tokio::spawn(async move { expire_job.expire_loop().await }));
        }

        handles
    }

    async fn refresh_loop(&self) {
        let mut interval = tokio::time::interval_at(
            Instant::now() + self.refresh_interval,
            self.refresh_interval,
        );
        // A cycle may run as long as the interval itself.
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.refresh_stop.cancelled() => {
                    info!("CacheMaintenanceJob (refresh): shutting down");
                    break;
                }
                _ = interval.tick() => {
                    // Stopping abandons an in-flight cycle.
                    let result = tokio::select! {
                        _ = self.refresh_stop.cancelled() => {
                            info!("CacheMaintenanceJob (refresh): stopped during a cycle");
                            break;
                        }
                        result = self.maintenance.run_refresh_cycle() => result,
                    };
                    match result {
                        Ok(outcome) => {
                            if outcome.candidates_found > 0 {
                                info!(
                                    candidates = outcome.candidates_found,
                                    refreshed = outcome.refreshed,
                                    evicted = outcome.evicted,
                                    failed = outcome.failed,
                                    skipped = outcome.skipped,
                                    cache_size = outcome.cache_size,
                                    "Cache refresh cycle completed"
                                );
                            }
                        }
                        Err(e) => {
                            error!(error = %e, "Cache refresh cycle failed");
                        }
                    }
                }
            }
        }
    }

    async fn expire_loop(&self) {
        let mut interval = tokio::time::interval_at(
            Instant::now() + self.expire_interval,
            self.expire_interval,
        );
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.expire_stop.cancelled() => {
                    info!("CacheMaintenanceJob (expire): shutting down");
                    break;
                }
                _ = interval.tick() => {
                    match self.maintenance.run_expire_cycle().await {
                        Ok(outcome) => {
                            if outcome.entries_removed > 0 {
                                info!(
                                    entries_removed = outcome.entries_removed,
                                    cache_size = outcome.cache_size,
                                    "Cache expire cycle completed"
                                );
                            }
                        }
                        Err(e) => {
                            error!(error = %e, "Cache expire cycle failed");
                        }
                    }
                }
            }
        }
    }
}
