pub mod metrics;
pub mod store;

pub use metrics::ResolverMetrics;
pub use store::HostCache;
