pub mod cache;
pub mod cache_maintenance;
pub mod forwarding;
pub mod lookup;
pub mod resolver;
pub mod server;
pub mod transport;
pub mod wire;

pub use cache::{HostCache, ResolverMetrics};
pub use cache_maintenance::DnsCacheMaintenance;
pub use forwarding::UdpForwarder;
pub use lookup::NetworkLookup;
pub use resolver::{CachingResolver, ResolverBuilder, ResolverConfig};
pub use server::{DnsServer, QueryHandler};
