use super::forwarding::{MessageBuilder, ResponseParser};
use super::transport::UdpTransport;
use async_trait::async_trait;
use dnscached_application::ports::HostLookup;
use dnscached_domain::{DomainError, RecordType};
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tracing::debug;

const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(2);

/// Resolves hostnames either against an explicit upstream over UDP (A and
/// AAAA in parallel) or through the operating system resolver.
#[derive(Debug, Clone)]
pub struct NetworkLookup {
    timeout: Duration,
}

impl Default for NetworkLookup {
    fn default() -> Self {
        Self::new(DEFAULT_QUERY_TIMEOUT)
    }
}

impl NetworkLookup {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn query_upstream(
        &self,
        transport: &UdpTransport,
        hostname: &str,
        record_type: RecordType,
    ) -> Result<Vec<IpAddr>, DomainError> {
        let (id, request) = MessageBuilder::build_query(hostname, &record_type)?;
        let response = transport.send(&request, self.timeout).await?;
        ResponseParser::parse_for(&response, id)?.into_addresses()
    }

    async fn lookup_upstream(
        &self,
        hostname: &str,
        server: SocketAddr,
    ) -> Result<Vec<IpAddr>, DomainError> {
        let transport = UdpTransport::new(server);

        let (v4, v6) = tokio::join!(
            self.query_upstream(&transport, hostname, RecordType::A),
            self.query_upstream(&transport, hostname, RecordType::AAAA),
        );

        let addresses = match (v4, v6) {
            (Err(DomainError::NxDomain), _) | (_, Err(DomainError::NxDomain)) => {
                return Err(DomainError::NxDomain)
            }
            (Ok(mut v4), Ok(v6)) => {
                v4.extend(v6);
                v4
            }
            (Ok(addrs), Err(e)) | (Err(e), Ok(addrs)) => {
                if addrs.is_empty() {
                    return Err(e);
                }
                debug!(hostname, server = %server, error = %e, "Partial answer, one family failed");
                addrs
            }
            (Err(e), Err(_)) => return Err(e),
        };

        if addresses.is_empty() {
            return Err(DomainError::ResolutionFailed {
                hostname: hostname.to_string(),
                reason: "no address records".to_string(),
            });
        }
        Ok(addresses)
    }

    async fn lookup_system(&self, hostname: &str) -> Result<Vec<IpAddr>, DomainError> {
        let resolved = tokio::time::timeout(self.timeout, tokio::net::lookup_host((hostname, 0)))
            .await
            .map_err(|_| DomainError::QueryTimeout)?
            .map_err(classify_system_error)?;

        let mut addresses: Vec<IpAddr> = Vec::new();
        for addr in resolved {
            let ip = addr.ip();
            if !addresses.contains(&ip) {
                addresses.push(ip);
            }
        }

        if addresses.is_empty() {
            return Err(DomainError::ResolutionFailed {
                hostname: hostname.to_string(),
                reason: "no address records".to_string(),
            });
        }
        Ok(addresses)
    }
}

// getaddrinfo reports a missing name only through its message text.
fn classify_system_error(e: io::Error) -> DomainError {
    let message = e.to_string().to_lowercase();
    if message.contains("not known")
        || message.contains("no address associated")
        || message.contains("nodename nor servname")
        || message.contains("no such host")
    {
        DomainError::NxDomain
    } else {
        DomainError::IoError(e.to_string())
    }
}

#[async_trait]
impl HostLookup for NetworkLookup {
    async fn lookup_ip(
        &self,
        hostname: &str,
        server: Option<SocketAddr>,
    ) -> Result<Vec<IpAddr>, DomainError> {
        match server {
            Some(server) => self.lookup_upstream(hostname, server).await,
            None => self.lookup_system(hostname).await,
        }
    }
}
