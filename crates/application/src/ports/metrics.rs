use std::fmt;

/// Point-in-time copy of the resolver counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub lookups: u64,
    pub hits: u64,
    pub misses: u64,
    pub retries: u64,
    pub errors: u64,
    /// High-water mark of `hits`.
    pub peak: u64,
}

impl MetricsSnapshot {
    /// `lookups == hits + misses` and `peak >= hits`.
    pub fn is_consistent(&self) -> bool {
        self.lookups == self.hits + self.misses && self.peak >= self.hits
    }

    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total > 0 {
            (self.hits as f64 / total as f64) * 100.0
        } else {
            0.0
        }
    }
}

impl fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lookups: {}, Hits: {}, Misses: {}, Retries: {}, Errors: {}, Peak: {}",
            self.lookups, self.hits, self.misses, self.retries, self.errors, self.peak
        )
    }
}
