#![allow(dead_code)]

use async_trait::async_trait;
use dnscached_application::ports::{CacheExpireOutcome, CacheMaintenancePort, CacheRefreshOutcome};
use dnscached_domain::DomainError;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

pub struct MockCacheMaintenancePort {
    refresh_call_count: Arc<AtomicU64>,
    expire_call_count: Arc<AtomicU64>,
    should_fail_refresh: AtomicBool,
    should_fail_expire: AtomicBool,
    refresh_outcome: RwLock<CacheRefreshOutcome>,
    expire_outcome: RwLock<CacheExpireOutcome>,
    refresh_delay: Duration,
}

impl MockCacheMaintenancePort {
    pub fn new() -> Self {
        Self {
            refresh_call_count: Arc::new(AtomicU64::new(0)),
            expire_call_count: Arc::new(AtomicU64::new(0)),
            should_fail_refresh: AtomicBool::new(false),
            should_fail_expire: AtomicBool::new(false),
            refresh_outcome: RwLock::new(CacheRefreshOutcome::default()),
            expire_outcome: RwLock::new(CacheExpireOutcome::default()),
            refresh_delay: Duration::ZERO,
        }
    }

    pub fn with_refresh_outcome(mut self, outcome: CacheRefreshOutcome) -> Self {
        self.refresh_outcome = RwLock::new(outcome);
        self
    }

    pub fn with_expire_outcome(mut self, outcome: CacheExpireOutcome) -> Self {
        self.expire_outcome = RwLock::new(outcome);
        self
    }

    /// Each refresh cycle sleeps this long before reporting.
    pub fn with_refresh_delay(mut self, delay: Duration) -> Self {
        self.refresh_delay = delay;
        self
    }

    pub fn refresh_call_count(&self) -> u64 {
        self.refresh_call_count.load(Ordering::Relaxed)
    }

    pub fn expire_call_count(&self) -> u64 {
        self.expire_call_count.load(Ordering::Relaxed)
    }

    pub fn set_should_fail_refresh(&self, fail: bool) {
        self.should_fail_refresh.store(fail, Ordering::Relaxed);
    }

    pub fn set_should_fail_expire(&self, fail: bool) {
        self.should_fail_expire.store(fail, Ordering::Relaxed);
    }
}

#[async_trait]
impl CacheMaintenancePort for MockCacheMaintenancePort {
    async fn run_refresh_cycle(&self) -> Result<CacheRefreshOutcome, DomainError> {
        self.refresh_call_count.fetch_add(1, Ordering::Relaxed);
        if !self.refresh_delay.is_zero() {
            tokio::time::sleep(self.refresh_delay).await;
        }
        if self.should_fail_refresh.load(Ordering::Relaxed) {
            return Err(DomainError::IoError("mock refresh failure".into()));
        }
        Ok(self.refresh_outcome.read().await.clone())
    }

    async fn run_expire_cycle(&self) -> Result<CacheExpireOutcome, DomainError> {
        self.expire_call_count.fetch_add(1, Ordering::Relaxed);
        if self.should_fail_expire.load(Ordering::Relaxed) {
            return Err(DomainError::IoError("mock expire failure".into()));
        }
        Ok(self.expire_outcome.read().await.clone())
    }
}
