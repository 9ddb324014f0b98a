#![allow(dead_code)]

use async_trait::async_trait;
use dnscached_application::ports::{DnsForwarder, HostLookup};
use dnscached_domain::DomainError;
use std::collections::{HashMap, VecDeque};
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

type LookupResult = Result<Vec<IpAddr>, DomainError>;

/// Scripted upstream. Each hostname has a queue of results; the last one
/// repeats forever. Unknown hostnames answer NXDOMAIN.
pub struct MockHostLookup {
    responses: Arc<RwLock<HashMap<String, VecDeque<LookupResult>>>>,
    servers_seen: Arc<RwLock<Vec<Option<SocketAddr>>>>,
    call_count: Arc<AtomicU64>,
    call_times: Arc<RwLock<Vec<Instant>>>,
    delay: Option<Duration>,
}

impl MockHostLookup {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(RwLock::new(HashMap::new())),
            servers_seen: Arc::new(RwLock::new(Vec::new())),
            call_count: Arc::new(AtomicU64::new(0)),
            call_times: Arc::new(RwLock::new(Vec::new())),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub async fn set_addresses(&self, hostname: &str, ips: &[&str]) {
        let ips = ips.iter().map(|ip| ip.parse().unwrap()).collect();
        self.set_sequence(hostname, vec![Ok(ips)]).await;
    }

    pub async fn set_error(&self, hostname: &str, error: DomainError) {
        self.set_sequence(hostname, vec![Err(error)]).await;
    }

    pub async fn set_sequence(&self, hostname: &str, results: Vec<LookupResult>) {
        self.responses
            .write()
            .await
            .insert(hostname.to_string(), results.into());
    }

    pub fn call_count(&self) -> u64 {
        self.call_count.load(Ordering::Relaxed)
    }

    pub async fn servers_seen(&self) -> Vec<Option<SocketAddr>> {
        self.servers_seen.read().await.clone()
    }

    /// When each lookup started, in call order.
    pub async fn call_times(&self) -> Vec<Instant> {
        self.call_times.read().await.clone()
    }
}

#[async_trait]
impl HostLookup for MockHostLookup {
    async fn lookup_ip(&self, hostname: &str, server: Option<SocketAddr>) -> LookupResult {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        self.call_times.write().await.push(Instant::now());
        self.servers_seen.write().await.push(server);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let mut responses = self.responses.write().await;
        match responses.get_mut(hostname) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) => queue.front().cloned().unwrap_or(Err(DomainError::NxDomain)),
            None => Err(DomainError::NxDomain),
        }
    }
}

pub struct MockDnsForwarder {
    response: Arc<RwLock<Option<Vec<u8>>>>,
    last_request: Arc<RwLock<Option<(SocketAddr, Vec<u8>)>>>,
    call_count: Arc<AtomicU64>,
}

impl MockDnsForwarder {
    /// Replies with `response` to every request.
    pub fn replying(response: Vec<u8>) -> Self {
        Self {
            response: Arc::new(RwLock::new(Some(response))),
            last_request: Arc::new(RwLock::new(None)),
            call_count: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Every request times out.
    pub fn failing() -> Self {
        Self {
            response: Arc::new(RwLock::new(None)),
            last_request: Arc::new(RwLock::new(None)),
            call_count: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn call_count(&self) -> u64 {
        self.call_count.load(Ordering::Relaxed)
    }

    pub async fn last_request(&self) -> Option<(SocketAddr, Vec<u8>)> {
        self.last_request.read().await.clone()
    }
}

#[async_trait]
impl DnsForwarder for MockDnsForwarder {
    async fn forward(
        &self,
        upstream: SocketAddr,
        request: &[u8],
        _timeout: Duration,
    ) -> Result<Vec<u8>, DomainError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_request.write().await = Some((upstream, request.to_vec()));

        match self.response.read().await.clone() {
            Some(response) => Ok(response),
            None => Err(DomainError::TransportTimeout {
                server: upstream.to_string(),
            }),
        }
    }
}
