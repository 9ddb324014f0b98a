use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Resolved addresses for one hostname plus the window they stay fresh for.
///
/// `ips` is never empty: constructors return `None` for an empty address list
/// so an entry without addresses cannot reach the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub ips: Arc<[IpAddr]>,
    /// Time of the last resolution that changed the address set.
    pub created: Instant,
    pub ttl: Duration,
}

impl CacheEntry {
    pub fn new(ips: impl Into<Arc<[IpAddr]>>, ttl: Duration) -> Option<Self> {
        Self::with_created(ips, ttl, Instant::now())
    }

    pub fn with_created(
        ips: impl Into<Arc<[IpAddr]>>,
        ttl: Duration,
        created: Instant,
    ) -> Option<Self> {
        let ips = ips.into();
        if ips.is_empty() {
            return None;
        }
        Some(Self { ips, created, ttl })
    }

    #[inline]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// `now > created + ttl`; an overflowing deadline never expires.
    #[inline]
    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.created.checked_add(self.ttl) {
            Some(deadline) => now > deadline,
            None => false,
        }
    }

    pub fn expires_at(&self) -> Option<Instant> {
        self.created.checked_add(self.ttl)
    }

    pub fn remaining_ttl(&self) -> Duration {
        self.expires_at()
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
            .unwrap_or(Duration::MAX)
    }

    pub fn same_addresses(&self, ips: &[IpAddr]) -> bool {
        *self.ips == *ips
    }

    /// Applies a fresh resolution. An identical address set only takes the
    /// new `ttl` and keeps `created`; a different set replaces everything.
    pub fn update(&mut self, ips: Arc<[IpAddr]>, ttl: Duration, now: Instant) {
        if ips.is_empty() {
            return;
        }
        if self.same_addresses(&ips) {
            self.ttl = ttl;
            return;
        }
        self.ips = ips;
        self.created = now;
        self.ttl = ttl;
    }
}
