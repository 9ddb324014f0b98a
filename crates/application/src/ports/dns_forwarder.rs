use async_trait::async_trait;
use dnscached_domain::DomainError;
use std::net::SocketAddr;
use std::time::Duration;

/// Relays a raw DNS request to an upstream server and returns its raw reply.
#[async_trait]
pub trait DnsForwarder: Send + Sync {
    async fn forward(
        &self,
        upstream: SocketAddr,
        request: &[u8],
        timeout: Duration,
    ) -> Result<Vec<u8>, DomainError>;
}
