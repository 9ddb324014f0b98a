use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DnsConfig {
    /// Upstream resolvers tried in order. Empty means the system resolver.
    #[serde(default)]
    pub upstream_servers: Vec<String>,

    /// Receives queries the cache cannot answer (non-A/AAAA types).
    #[serde(default)]
    pub forwarder: Option<String>,

    #[serde(default = "default_cache_size")]
    pub cache_size: usize,

    /// Seconds between refresh cycles; 0 disables background refresh.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: u64,

    /// Seconds between expire sweeps; 0 disables background expiry.
    #[serde(default = "default_expire_interval")]
    pub expire_interval: u64,

    #[serde(default = "default_cache_ttl")]
    pub cache_ttl: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,

    #[serde(default = "default_forward_timeout_ms")]
    pub forward_timeout_ms: u64,

    /// TTL written into answer records.
    #[serde(default = "default_answer_ttl")]
    pub answer_ttl: u32,
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            upstream_servers: Vec::new(),
            forwarder: None,
            cache_size: default_cache_size(),
            refresh_interval: default_refresh_interval(),
            expire_interval: default_expire_interval(),
            cache_ttl: default_cache_ttl(),
            max_retries: default_max_retries(),
            query_timeout_ms: default_query_timeout_ms(),
            forward_timeout_ms: default_forward_timeout_ms(),
            answer_ttl: default_answer_ttl(),
        }
    }
}

impl DnsConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval)
    }

    pub fn expire_interval(&self) -> Duration {
        Duration::from_secs(self.expire_interval)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn forward_timeout(&self) -> Duration {
        Duration::from_millis(self.forward_timeout_ms)
    }
}

fn default_cache_size() -> usize {
    1024
}

fn default_refresh_interval() -> u64 {
    300
}

fn default_expire_interval() -> u64 {
    60
}

fn default_cache_ttl() -> u64 {
    3600
}

fn default_max_retries() -> u32 {
    3
}

fn default_query_timeout_ms() -> u64 {
    2000
}

fn default_forward_timeout_ms() -> u64 {
    8000
}

fn default_answer_ttl() -> u32 {
    60
}
