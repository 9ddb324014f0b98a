use async_trait::async_trait;
use dnscached_domain::DomainError;
use std::net::{IpAddr, SocketAddr};

/// One network resolution attempt, without caching or retries.
#[async_trait]
pub trait HostLookup: Send + Sync {
    /// Resolves A and AAAA records for `hostname`.
    ///
    /// With `server` set the query goes to that upstream only; `None` means
    /// the system resolver. An authoritative negative answer must surface as
    /// `DomainError::NxDomain` so callers stop retrying.
    async fn lookup_ip(
        &self,
        hostname: &str,
        server: Option<SocketAddr>,
    ) -> Result<Vec<IpAddr>, DomainError>;
}
