use dnscached_application::ports::MetricsSnapshot;
use std::sync::atomic::{AtomicU64, Ordering};

// align(64) keeps the per-query counters on their own cache line, away from
// the rarely touched retry/error counters.
#[derive(Debug, Default)]
#[repr(align(64))]
pub struct ResolverMetrics {
    // Hot: touched on every fetch.
    lookups: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    peak: AtomicU64,
    _hot_pad: [u64; 4],

    // Cold: only on upstream failures.
    retries: AtomicU64,
    errors: AtomicU64,
}

impl ResolverMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_lookup(&self) {
        self.lookups.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_hit(&self) {
        let hits = self.hits.fetch_add(1, Ordering::Relaxed) + 1;
        self.peak.fetch_max(hits, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            lookups: self.lookups.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            peak: self.peak.load(Ordering::Relaxed),
        }
    }

    /// Returns whether `lookups == hits + misses` and `peak >= hits` held
    /// when checked. With `repair`, a short `lookups` is raised to
    /// `hits + misses` and `peak` is raised to `hits`; nothing is lowered.
    pub fn check_consistency(&self, repair: bool) -> bool {
        let snapshot = self.snapshot();
        let consistent = snapshot.is_consistent();

        if !consistent && repair {
            let expected = snapshot.hits + snapshot.misses;
            self.lookups.fetch_max(expected, Ordering::Relaxed);
            self.peak.fetch_max(snapshot.hits, Ordering::Relaxed);
        }

        consistent
    }
}
