use super::wire::{parse_request, ParsedRequest, ResponseBuilder};
use dnscached_application::ports::{DnsForwarder, HostResolver};
use dnscached_domain::dns_wire::MAX_UDP_RECEIVE_SIZE;
use dnscached_domain::{RecordType, ResponseCode};
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

const DEFAULT_ANSWER_TTL: u32 = 60;
const DEFAULT_FORWARD_TIMEOUT: Duration = Duration::from_secs(8);

/// Turns one request packet into at most one response packet.
pub struct QueryHandler {
    resolver: Arc<dyn HostResolver>,
    forwarder: Option<(Arc<dyn DnsForwarder>, SocketAddr)>,
    forward_timeout: Duration,
    answer_ttl: u32,
}

impl QueryHandler {
    pub fn new(resolver: Arc<dyn HostResolver>) -> Self {
        Self {
            resolver,
            forwarder: None,
            forward_timeout: DEFAULT_FORWARD_TIMEOUT,
            answer_ttl: DEFAULT_ANSWER_TTL,
        }
    }

    pub fn with_forwarder(mut self, forwarder: Arc<dyn DnsForwarder>, upstream: SocketAddr) -> Self {
        self.forwarder = Some((forwarder, upstream));
        self
    }

    pub fn with_forward_timeout(mut self, timeout: Duration) -> Self {
        self.forward_timeout = timeout;
        self
    }

    pub fn with_answer_ttl(mut self, ttl: u32) -> Self {
        self.answer_ttl = ttl;
        self
    }

    /// `None` means the packet is dropped without a reply.
    pub async fn handle(&self, packet: &[u8]) -> Option<Vec<u8>> {
        let Some(request) = parse_request(packet) else {
            debug!(len = packet.len(), "Dropping short or non-query packet");
            return None;
        };

        if request.questions.is_empty() {
            debug!(
                id = request.header.id,
                qdcount = request.header.qdcount,
                "No parseable questions, answering FORMERR"
            );
            return Some(ResponseBuilder::format_error(&request.header));
        }

        if let Some((forwarder, upstream)) = &self.forwarder {
            if request.has_non_local_question() {
                return Some(self.forward(forwarder.as_ref(), *upstream, &request).await);
            }
        }

        Some(self.answer_locally(&request).await)
    }

    async fn forward(
        &self,
        forwarder: &dyn DnsForwarder,
        upstream: SocketAddr,
        request: &ParsedRequest<'_>,
    ) -> Vec<u8> {
        match forwarder
            .forward(upstream, request.packet, self.forward_timeout)
            .await
        {
            Ok(response) => {
                debug!(id = request.header.id, upstream = %upstream, "Relaying forwarded response");
                response
            }
            Err(e) => {
                warn!(id = request.header.id, upstream = %upstream, error = %e, "Forwarding failed");
                let mut builder = ResponseBuilder::new(&request.header);
                for question in &request.questions {
                    if builder.push_question(request.question_bytes(question)).is_none() {
                        break;
                    }
                }
                builder.set_rcode(ResponseCode::NxDomain);
                builder.finish()
            }
        }
    }

    async fn answer_locally(&self, request: &ParsedRequest<'_>) -> Vec<u8> {
        let mut builder = ResponseBuilder::new(&request.header);

        // Question section first, answers follow pointing back at these offsets.
        let mut name_offsets = Vec::with_capacity(request.questions.len());
        for question in &request.questions {
            match builder.push_question(request.question_bytes(question)) {
                Some(offset) => name_offsets.push(offset),
                None => break,
            }
        }

        for (question, name_offset) in request.questions.iter().zip(name_offsets) {
            if builder.is_truncated() {
                break;
            }
            if !question.is_local() {
                continue;
            }

            match self.resolver.fetch(&question.name).await {
                Ok(ips) => {
                    let wanted = ips
                        .iter()
                        .filter(|ip| address_matches(question.record_type, ip));
                    for ip in wanted {
                        if !builder.push_answer(name_offset, *ip, self.answer_ttl) {
                            break;
                        }
                    }
                }
                Err(e) => {
                    debug!(name = %question.name, error = %e, "Answering NXDOMAIN");
                    // Applies to the whole packet, answers already added stay.
                    builder.set_rcode(ResponseCode::NxDomain);
                }
            }
        }

        debug!(
            id = request.header.id,
            answers = builder.answer_count(),
            truncated = builder.is_truncated(),
            "Sending response"
        );
        builder.finish()
    }
}

fn address_matches(record_type: RecordType, ip: &IpAddr) -> bool {
    matches!(
        (record_type, ip),
        (RecordType::A, IpAddr::V4(_)) | (RecordType::AAAA, IpAddr::V6(_))
    )
}

/// UDP listener dispatching each datagram to a `QueryHandler` task.
pub struct DnsServer {
    socket: Arc<UdpSocket>,
    handler: Arc<QueryHandler>,
    shutdown: CancellationToken,
}

impl DnsServer {
    pub fn bind(
        addr: SocketAddr,
        handler: Arc<QueryHandler>,
        shutdown: CancellationToken,
    ) -> io::Result<Self> {
        let socket = create_udp_socket(addr)?;
        Ok(Self {
            socket: Arc::new(socket),
            handler,
            shutdown,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Receives until the shutdown token is cancelled.
    ///
    /// One task is spawned per datagram with no upper bound on in-flight
    /// tasks. TODO: bound in-flight requests with a semaphore once a
    /// sensible limit is measured under load.
    pub async fn run(self) -> io::Result<()> {
        info!(bind_address = %self.local_addr()?, "DNS server listening");
        // Responses we build stay within 512 bytes; queries may carry EDNS(0).
        let mut recv_buf = vec![0u8; MAX_UDP_RECEIVE_SIZE];

        loop {
            let (len, peer) = tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("DNS server stopped");
                    return Ok(());
                }
                result = self.socket.recv_from(&mut recv_buf) => match result {
                    Ok(received) => received,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        // ICMP port unreachable from an earlier reply surfaces here on some platforms.
                        error!(error = %e, "UDP recv error");
                        continue;
                    }
                },
            };

            let packet: Arc<[u8]> = Arc::from(&recv_buf[..len]);
            let handler = Arc::clone(&self.handler);
            let socket = Arc::clone(&self.socket);

            tokio::spawn(async move {
                if let Some(response) = handler.handle(&packet).await {
                    if let Err(e) = socket.send_to(&response, peer).await {
                        error!(client = %peer, error = %e, "Failed to send response");
                    }
                }
            });
        }
    }
}

fn create_udp_socket(addr: SocketAddr) -> io::Result<UdpSocket> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
    if addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }
    socket.set_reuse_address(true)?;
    socket.bind(&addr.into())?;
    socket.set_nonblocking(true)?;

    let std_socket: std::net::UdpSocket = socket.into();
    UdpSocket::from_std(std_socket)
}
