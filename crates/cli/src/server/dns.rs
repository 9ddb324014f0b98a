use dnscached_infrastructure::dns::{DnsServer, QueryHandler};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Binds the UDP listener and serves until `shutdown` is cancelled.
pub async fn start_dns_server(
    bind_addr: String,
    handler: Arc<QueryHandler>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let socket_addr: SocketAddr = bind_addr.parse()?;
    let server = DnsServer::bind(socket_addr, handler, shutdown)?;

    info!(bind_address = %server.local_addr()?, "DNS server ready");
    server.run().await?;
    Ok(())
}
