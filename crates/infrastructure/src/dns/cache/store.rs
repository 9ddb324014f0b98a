use dnscached_application::ports::CacheStore;
use dnscached_domain::CacheEntry;
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};
use tracing::debug;

/// Hostname → addresses map behind a single coarse lock.
///
/// Reads share the lock, writes take it exclusively. No method holds the
/// lock past its own return, so callers may freely `.await` between calls.
#[derive(Default)]
pub struct HostCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl HostCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::with_capacity(capacity)),
        }
    }

    // A panic while holding the lock leaves the map itself intact; keep serving.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn insert_at(&self, hostname: &str, ips: Arc<[IpAddr]>, ttl: Duration, now: Instant) {
        if ips.is_empty() {
            return;
        }

        let mut entries = self.write();
        match entries.get_mut(hostname) {
            Some(entry) => entry.update(ips, ttl, now),
            None => {
                if let Some(entry) = CacheEntry::with_created(ips, ttl, now) {
                    entries.insert(hostname.to_string(), entry);
                }
            }
        }
    }

    /// Snapshot of the key set. The lock is released before the first item
    /// is yielded, so the iterator may be held across awaits.
    pub fn range(&self) -> impl Iterator<Item = String> {
        let keys: Vec<String> = self.read().keys().cloned().collect();
        keys.into_iter()
    }
}

impl CacheStore for HostCache {
    fn create(&self, hostname: &str, ips: Arc<[IpAddr]>, ttl: Duration) {
        self.insert_at(hostname, ips, ttl, Instant::now());
    }

    fn get(&self, hostname: &str) -> Option<Arc<[IpAddr]>> {
        self.read().get(hostname).map(|entry| Arc::clone(&entry.ips))
    }

    fn get_entry(&self, hostname: &str) -> Option<CacheEntry> {
        self.read().get(hostname).cloned()
    }

    fn delete(&self, hostname: &str) -> bool {
        self.write().remove(hostname).is_some()
    }

    fn exists(&self, hostname: &str) -> bool {
        self.read().contains_key(hostname)
    }

    fn hostnames(&self) -> Vec<String> {
        self.range().collect()
    }

    fn len(&self) -> usize {
        self.read().len()
    }

    fn remove_expired_at(&self, now: Instant) -> usize {
        let mut entries = self.write();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        let removed = before - entries.len();

        if removed > 0 {
            debug!(removed, remaining = entries.len(), "Expired cache entries removed");
        }
        removed
    }
}
