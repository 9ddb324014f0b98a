mod cache_maintenance_port;
mod cache_store;
mod dns_forwarder;
mod host_lookup;
mod host_resolver;
mod metrics;

pub use cache_maintenance_port::{CacheExpireOutcome, CacheMaintenancePort, CacheRefreshOutcome};
pub use cache_store::CacheStore;
pub use dns_forwarder::DnsForwarder;
pub use host_lookup::HostLookup;
pub use host_resolver::HostResolver;
pub use metrics::MetricsSnapshot;
