use dnscached_application::ports::{CacheMaintenancePort, HostResolver};
use dnscached_domain::{parse_upstream_server, Config};
use dnscached_infrastructure::dns::{
    CachingResolver, DnsCacheMaintenance, NetworkLookup, QueryHandler, ResolverBuilder,
    ResolverConfig, ResolverMetrics, UdpForwarder,
};
use dnscached_jobs::CacheMaintenanceJob;
use std::sync::Arc;
use tracing::{info, warn};

pub struct DnsServices {
    pub resolver: Arc<CachingResolver>,
    pub handler: Arc<QueryHandler>,
    pub cache_maintenance: Arc<CacheMaintenanceJob>,
}

impl DnsServices {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        info!("Initializing DNS services");

        let resolver = Self::build_resolver(config);
        let handler = Arc::new(Self::build_handler(config, &resolver)?);
        let cache_maintenance = Self::build_cache_maintenance(config, &resolver);

        info!("DNS services initialized");
        Ok(Self {
            resolver,
            handler,
            cache_maintenance,
        })
    }

    fn build_resolver(config: &Config) -> Arc<CachingResolver> {
        let resolver_config = ResolverConfig::from(&config.dns);

        match &resolver_config.upstream_servers {
            Some(servers) if servers.is_empty() => {
                warn!("No valid upstream server configured, every lookup will fail")
            }
            Some(servers) => info!(upstreams = servers.len(), "Using configured upstream servers"),
            None => info!("No upstream servers configured, using the system resolver"),
        }

        let lookup = Arc::new(NetworkLookup::new(resolver_config.query_timeout));
        ResolverBuilder::new(lookup)
            .with_config(resolver_config)
            .with_metrics(Arc::new(ResolverMetrics::new()))
            .build()
    }

    fn build_handler(config: &Config, resolver: &Arc<CachingResolver>) -> anyhow::Result<QueryHandler> {
        let mut handler = QueryHandler::new(Arc::clone(resolver) as Arc<dyn HostResolver>)
            .with_answer_ttl(config.dns.answer_ttl)
            .with_forward_timeout(config.dns.forward_timeout());

        if let Some(forwarder) = &config.dns.forwarder {
            let upstream = parse_upstream_server(forwarder)
                .ok_or_else(|| anyhow::anyhow!("Invalid forwarder address '{}'", forwarder))?;
            info!(forwarder = %upstream, "Forwarding non-address queries");
            handler = handler.with_forwarder(Arc::new(UdpForwarder::new()), upstream);
        }

        Ok(handler)
    }

    fn build_cache_maintenance(
        config: &Config,
        resolver: &Arc<CachingResolver>,
    ) -> Arc<CacheMaintenanceJob> {
        let maintenance: Arc<dyn CacheMaintenancePort> =
            Arc::new(DnsCacheMaintenance::new(Arc::clone(resolver)));

        Arc::new(
            CacheMaintenanceJob::new(maintenance)
                .with_refresh_interval(config.dns.refresh_interval())
                .with_expire_interval(config.dns.expire_interval())
                .with_cancellation(resolver.shutdown_token()),
        )
    }
}
