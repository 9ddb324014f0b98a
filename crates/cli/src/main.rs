use clap::Parser;
use dnscached_domain::CliOverrides;
use tracing::{error, info};

mod bootstrap;
mod di;
mod server;

#[derive(Parser)]
#[command(name = "dnscached")]
#[command(version = "0.1.0")]
#[command(about = "dnscached - caching DNS resolver with background refresh")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// DNS server port
    #[arg(short = 'd', long)]
    dns_port: Option<u16>,

    /// Bind address
    #[arg(short = 'b', long)]
    bind: Option<String>,

    /// Upstream DNS server receiving non-address queries (IP or IP:port)
    #[arg(long)]
    forwarder: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Write the effective configuration to FILE and exit
    #[arg(long, value_name = "FILE")]
    save_config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        dns_port: cli.dns_port,
        bind_address: cli.bind.clone(),
        forwarder: cli.forwarder.clone(),
        log_level: cli.log_level.clone(),
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    if let Some(path) = cli.save_config.as_deref() {
        config.save(path)?;
        println!("Configuration written to {}", path);
        return Ok(());
    }

    bootstrap::init_logging(&config);

    info!("Starting dnscached v{}", env!("CARGO_PKG_VERSION"));

    let dns_services = di::DnsServices::new(&config)?;
    let resolver = dns_services.resolver.clone();

    let job_handles = dns_services.cache_maintenance.clone().start().await;

    let dns_addr = config.server.listen_addr();
    let server_shutdown = resolver.shutdown_token().child_token();
    let dns_server = tokio::spawn(server::start_dns_server(
        dns_addr,
        dns_services.handler.clone(),
        server_shutdown,
    ));

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                error!(error = %e, "Failed to listen for shutdown signal");
            }
            info!("Shutdown signal received");
        }
        result = dns_server => {
            match result {
                Ok(Ok(())) => info!("DNS server exited"),
                Ok(Err(e)) => {
                    resolver.close();
                    return Err(e);
                }
                Err(e) => error!(error = %e, "DNS server task failed"),
            }
        }
    }

    resolver.close();
    for handle in job_handles {
        if let Err(e) = handle.await {
            error!(error = %e, "Background job task failed");
        }
    }

    info!(metrics = %resolver.metrics(), "Server shutdown complete");
    Ok(())
}
