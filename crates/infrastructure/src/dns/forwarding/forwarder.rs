use crate::dns::transport::UdpTransport;
use async_trait::async_trait;
use dnscached_application::ports::DnsForwarder;
use dnscached_domain::dns_wire::HEADER_LEN;
use dnscached_domain::DomainError;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::debug;

/// Relays a client packet to an upstream server unchanged and returns the
/// upstream's reply unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct UdpForwarder;

impl UdpForwarder {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DnsForwarder for UdpForwarder {
    async fn forward(
        &self,
        upstream: SocketAddr,
        request: &[u8],
        timeout: Duration,
    ) -> Result<Vec<u8>, DomainError> {
        if request.len() < HEADER_LEN {
            return Err(DomainError::InvalidDnsResponse(
                "Request shorter than a DNS header".to_string(),
            ));
        }

        let bytes = UdpTransport::new(upstream).send(request, timeout).await?;

        if bytes.len() < HEADER_LEN || bytes[..2] != request[..2] {
            return Err(DomainError::InvalidDnsResponse(format!(
                "Mismatched or short reply from {}",
                upstream
            )));
        }

        debug!(upstream = %upstream, bytes = bytes.len(), "Forwarded query answered");
        Ok(bytes)
    }
}
