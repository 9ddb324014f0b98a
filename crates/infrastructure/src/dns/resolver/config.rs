use dnscached_domain::config::DnsConfig;
use dnscached_domain::parse_upstream_server;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::warn;

/// Immutable resolver settings, fixed at build time.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// `None` delegates to the system resolver. `Some` with no entries means
    /// every configured upstream was invalid, and lookups fail.
    pub upstream_servers: Option<Vec<SocketAddr>>,

    /// Attempts per upstream server before moving to the next one.
    pub max_retries: u32,

    pub default_ttl: Duration,

    /// Zero disables the background refresher.
    pub refresh_interval: Duration,

    pub cache_capacity: usize,

    /// Bound on a single upstream attempt.
    pub query_timeout: Duration,

    /// Minimum spacing between refresh lookups across a cycle.
    pub refresh_rate_limit: Duration,

    pub refresh_attempts: u32,

    /// Deadline for one refresh cycle; defaults to the refresh interval.
    pub refresh_cycle_timeout: Option<Duration>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            upstream_servers: None,
            max_retries: 3,
            default_ttl: Duration::from_secs(3600),
            refresh_interval: Duration::ZERO,
            cache_capacity: 0,
            query_timeout: Duration::from_millis(2000),
            refresh_rate_limit: Duration::from_millis(2),
            refresh_attempts: 3,
            refresh_cycle_timeout: None,
        }
    }
}

impl ResolverConfig {
    /// Parses each entry as `IP` or `IP:port`. Invalid entries are dropped
    /// and logged, never replaced.
    pub fn with_upstream_servers<S: AsRef<str>>(mut self, servers: &[S]) -> Self {
        let mut parsed = Vec::with_capacity(servers.len());
        for server in servers {
            match parse_upstream_server(server.as_ref()) {
                Some(addr) => parsed.push(addr),
                None => warn!(server = server.as_ref(), "Ignoring invalid upstream server"),
            }
        }
        self.upstream_servers = Some(parsed);
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    pub fn with_refresh_rate_limit(mut self, spacing: Duration) -> Self {
        self.refresh_rate_limit = spacing;
        self
    }

    pub fn with_refresh_cycle_timeout(mut self, timeout: Duration) -> Self {
        self.refresh_cycle_timeout = Some(timeout);
        self
    }

    pub fn cycle_timeout(&self) -> Option<Duration> {
        self.refresh_cycle_timeout.or({
            if self.refresh_interval.is_zero() {
                None
            } else {
                Some(self.refresh_interval)
            }
        })
    }
}

impl From<&DnsConfig> for ResolverConfig {
    fn from(dns: &DnsConfig) -> Self {
        let config = Self {
            max_retries: dns.max_retries,
            default_ttl: dns.cache_ttl(),
            refresh_interval: dns.refresh_interval(),
            cache_capacity: dns.cache_size,
            query_timeout: dns.query_timeout(),
            ..Self::default()
        };

        if dns.upstream_servers.is_empty() {
            config
        } else {
            config.with_upstream_servers(dns.upstream_servers.as_slice())
        }
    }
}
