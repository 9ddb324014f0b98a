//! UDP transport for DNS queries (RFC 1035 §4.2.1)
//!
//! Messages are sent as-is (no framing). One ephemeral socket per exchange,
//! connected to the server so datagrams from other peers are discarded by
//! the kernel.

use dnscached_domain::dns_wire::MAX_UDP_RECEIVE_SIZE;
use dnscached_domain::DomainError;
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::debug;

pub struct UdpTransport {
    server_addr: SocketAddr,
}

impl UdpTransport {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self { server_addr }
    }

    pub fn server_addr(&self) -> SocketAddr {
        self.server_addr
    }

    fn map_io_error(&self, e: io::Error) -> DomainError {
        match e.kind() {
            io::ErrorKind::ConnectionRefused => DomainError::TransportConnectionRefused {
                server: self.server_addr.to_string(),
            },
            io::ErrorKind::TimedOut => DomainError::TransportTimeout {
                server: self.server_addr.to_string(),
            },
            _ => DomainError::IoError(format!("UDP exchange with {}: {}", self.server_addr, e)),
        }
    }

    fn timed_out(&self) -> DomainError {
        DomainError::TransportTimeout {
            server: self.server_addr.to_string(),
        }
    }

    /// Sends one datagram and waits up to `timeout` for the reply.
    pub async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<Vec<u8>, DomainError> {
        let bind_addr = if self.server_addr.is_ipv4() {
            SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
        } else {
            SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
        };

        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|e| self.map_io_error(e))?;
        socket
            .connect(self.server_addr)
            .await
            .map_err(|e| self.map_io_error(e))?;

        let exchange = async {
            let bytes_sent = socket.send(message_bytes).await?;
            debug!(server = %self.server_addr, bytes_sent, "UDP query sent");

            let mut recv_buf = vec![0u8; MAX_UDP_RECEIVE_SIZE];
            let bytes_received = socket.recv(&mut recv_buf).await?;
            recv_buf.truncate(bytes_received);
            Ok::<_, io::Error>(recv_buf)
        };

        let bytes = tokio::time::timeout(timeout, exchange)
            .await
            .map_err(|_| self.timed_out())?
            .map_err(|e| self.map_io_error(e))?;

        debug!(
            server = %self.server_addr,
            bytes_received = bytes.len(),
            "UDP response received"
        );

        Ok(bytes)
    }
}
