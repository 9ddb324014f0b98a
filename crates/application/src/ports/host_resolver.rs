use async_trait::async_trait;
use dnscached_domain::DomainError;
use std::net::IpAddr;
use std::sync::Arc;

/// Cache-first resolution used by the protocol server.
#[async_trait]
pub trait HostResolver: Send + Sync {
    async fn fetch(&self, hostname: &str) -> Result<Arc<[IpAddr]>, DomainError>;
}
