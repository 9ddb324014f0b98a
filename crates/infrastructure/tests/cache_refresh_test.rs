use dnscached_application::ports::CacheMaintenancePort;
use dnscached_domain::DomainError;
use dnscached_infrastructure::dns::{
    CachingResolver, DnsCacheMaintenance, HostCache, ResolverBuilder, ResolverConfig,
};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

mod helpers;
use helpers::MockHostLookup;

fn addrs(ips: &[&str]) -> Arc<[IpAddr]> {
    ips.iter().map(|ip| ip.parse().unwrap()).collect()
}

fn build(lookup: &Arc<MockHostLookup>, config: ResolverConfig) -> Arc<CachingResolver> {
    ResolverBuilder::new(lookup.clone())
        .with_config(config.with_refresh_rate_limit(Duration::from_millis(1)))
        .build()
}

#[tokio::test]
async fn test_refresh_evicts_nxdomain_and_updates_live_hosts() {
    let lookup = Arc::new(MockHostLookup::new());
    lookup.set_error("gone.example.com", DomainError::NxDomain).await;
    lookup.set_addresses("alive.example.com", &["10.0.0.2"]).await;

    let resolver = build(&lookup, ResolverConfig::default());
    resolver.create("gone.example.com", addrs(&["10.0.0.9"]), Duration::from_secs(60));
    resolver.create("alive.example.com", addrs(&["10.0.0.1"]), Duration::from_secs(60));

    let outcome = resolver.refresh().await;

    assert_eq!(outcome.candidates_found, 2);
    assert_eq!(outcome.evicted, 1);
    assert_eq!(outcome.refreshed, 1);
    assert_eq!(outcome.failed, 0);
    assert_eq!(outcome.cache_size, 1);

    assert!(!resolver.exists("gone.example.com"));
    assert_eq!(
        resolver.get("alive.example.com").unwrap().ips.as_ref(),
        addrs(&["10.0.0.2"]).as_ref()
    );
}

#[tokio::test]
async fn test_refresh_transient_failure_keeps_entry() {
    let lookup = Arc::new(MockHostLookup::new());
    lookup
        .set_error("flaky.example.com", DomainError::QueryTimeout)
        .await;

    let config = ResolverConfig::default().with_max_retries(1);
    let resolver = build(&lookup, config);
    resolver.create("flaky.example.com", addrs(&["10.0.0.3"]), Duration::from_secs(60));

    let outcome = resolver.refresh().await;

    assert_eq!(outcome.failed, 1);
    assert_eq!(outcome.evicted, 0);
    assert!(resolver.exists("flaky.example.com"));
    assert_eq!(lookup.call_count(), 3, "three refresh attempts per host");
}

#[tokio::test]
async fn test_refresh_recovers_within_attempts() {
    let lookup = Arc::new(MockHostLookup::new());
    lookup
        .set_sequence(
            "recover.example.com",
            vec![
                Err(DomainError::QueryTimeout),
                Ok(vec!["10.0.0.4".parse().unwrap()]),
            ],
        )
        .await;

    let config = ResolverConfig::default().with_max_retries(1);
    let resolver = build(&lookup, config);
    resolver.create("recover.example.com", addrs(&["10.0.0.5"]), Duration::from_secs(60));

    let outcome = resolver.refresh().await;
    assert_eq!(outcome.refreshed, 1);
    assert_eq!(lookup.call_count(), 2);
}

#[tokio::test]
async fn test_refresh_spaces_every_lookup_including_retries() {
    let lookup = Arc::new(MockHostLookup::new());
    lookup.set_addresses("one.example.com", &["10.0.1.1"]).await;
    lookup
        .set_sequence(
            "two.example.com",
            vec![
                Err(DomainError::QueryTimeout),
                Ok(vec!["10.0.1.2".parse().unwrap()]),
            ],
        )
        .await;
    lookup.set_addresses("three.example.com", &["10.0.1.3"]).await;

    let spacing = Duration::from_millis(50);
    let resolver = ResolverBuilder::new(lookup.clone())
        .with_config(
            ResolverConfig::default()
                .with_max_retries(1)
                .with_refresh_rate_limit(spacing),
        )
        .build();
    for host in ["one.example.com", "two.example.com", "three.example.com"] {
        resolver.create(host, addrs(&["10.0.0.1"]), Duration::from_secs(60));
    }

    let outcome = resolver.refresh_until(None).await;
    assert_eq!(outcome.refreshed, 3);

    let times = lookup.call_times().await;
    assert_eq!(times.len(), 4);
    for pair in times.windows(2) {
        let gap = pair[1].duration_since(pair[0]);
        assert!(gap >= Duration::from_millis(45), "lookups only {:?} apart", gap);
    }
}

#[tokio::test]
async fn test_refresh_stops_at_deadline() {
    let lookup = Arc::new(MockHostLookup::new().with_delay(Duration::from_millis(100)));
    for i in 0..5 {
        lookup
            .set_addresses(&format!("slow{}.example.com", i), &["10.0.1.1"])
            .await;
    }

    let config = ResolverConfig::default().with_timeout(Duration::from_secs(5));
    let resolver = build(&lookup, config);
    for i in 0..5 {
        resolver.create(
            &format!("slow{}.example.com", i),
            addrs(&["10.0.1.1"]),
            Duration::from_secs(60),
        );
    }

    let deadline = tokio::time::Instant::now() + Duration::from_millis(150);
    let outcome = resolver.refresh_until(Some(deadline)).await;

    assert!(outcome.skipped >= 1, "{:?}", outcome);
    assert!(outcome.skipped < 5, "{:?}", outcome);
    assert_eq!(outcome.refreshed + outcome.skipped, 5);
    assert_eq!(outcome.cache_size, 5, "skipped hosts stay cached");
}

#[tokio::test]
async fn test_refresh_after_close_touches_nothing() {
    let lookup = Arc::new(MockHostLookup::new());
    let resolver = build(&lookup, ResolverConfig::default());
    resolver.create("idle.example.com", addrs(&["10.0.0.6"]), Duration::from_secs(60));

    resolver.close();
    let outcome = resolver.refresh().await;

    assert_eq!(outcome.skipped, 1);
    assert_eq!(lookup.call_count(), 0);
    assert!(resolver.exists("idle.example.com"));
}

#[tokio::test]
async fn test_maintenance_expire_cycle_removes_only_expired() {
    let lookup = Arc::new(MockHostLookup::new());
    let cache = Arc::new(HostCache::new());
    let resolver = ResolverBuilder::new(lookup.clone())
        .with_cache(cache.clone())
        .build();

    let past = Instant::now() - Duration::from_secs(5);
    cache.insert_at("old.example.com", addrs(&["10.0.0.7"]), Duration::from_secs(1), past);
    resolver.create("new.example.com", addrs(&["10.0.0.8"]), Duration::from_secs(60));

    let maintenance = DnsCacheMaintenance::new(resolver.clone());
    let outcome = maintenance.run_expire_cycle().await.unwrap();

    assert_eq!(outcome.entries_removed, 1);
    assert_eq!(outcome.cache_size, 1);
    assert!(resolver.exists("new.example.com"));
    assert_eq!(lookup.call_count(), 0, "expiry does no network I/O");
}

#[tokio::test]
async fn test_maintenance_refresh_cycle_delegates_to_resolver() {
    let lookup = Arc::new(MockHostLookup::new());
    lookup.set_addresses("m.example.com", &["10.0.0.10"]).await;
    let resolver = build(&lookup, ResolverConfig::default());
    resolver.create("m.example.com", addrs(&["10.0.0.10"]), Duration::from_secs(60));

    let maintenance = DnsCacheMaintenance::new(resolver.clone());
    let outcome = maintenance.run_refresh_cycle().await.unwrap();
    assert_eq!(outcome.refreshed, 1);

    resolver.close();
    assert_eq!(
        maintenance.run_refresh_cycle().await.unwrap_err(),
        DomainError::Cancelled
    );
}
