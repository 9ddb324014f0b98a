use dnscached_domain::CacheEntry;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Keyed store of resolved hostnames.
///
/// Hostnames are matched exactly; callers normalize. No operation fails:
/// writes with an empty address list are no-ops.
pub trait CacheStore: Send + Sync {
    /// Inserts a new entry or applies the update-if-different rule to an
    /// existing one.
    fn create(&self, hostname: &str, ips: Arc<[IpAddr]>, ttl: Duration);

    /// Stored addresses, expired or not.
    fn get(&self, hostname: &str) -> Option<Arc<[IpAddr]>>;

    fn get_entry(&self, hostname: &str) -> Option<CacheEntry>;

    fn delete(&self, hostname: &str) -> bool;

    fn exists(&self, hostname: &str) -> bool;

    /// Point-in-time copy of the cached hostnames.
    fn hostnames(&self) -> Vec<String>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deletes every entry expired at `now`, returning how many were removed.
    fn remove_expired_at(&self, now: Instant) -> usize;
}
