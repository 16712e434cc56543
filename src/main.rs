//! dados-server: loads config, prepares the store and serves the `/dados` routes.

use std::net::{IpAddr, SocketAddr, UdpSocket};

use anyhow::Context;
use clap::Parser;

use dados_ingest::cli::Cli;
use dados_ingest::logging::init_logging;
use dados_ingest::{build_router, AppState, JsonFileStore, ServiceConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = ServiceConfig::load(&cli.config, &cli.overrides())
        .with_context(|| format!("loading configuration ({})", cli.config.display()))?;
    tracing::debug!(?config, "configuration loaded");

    let store = JsonFileStore::open(&config.store_path)
        .with_context(|| format!("initializing store at {}", config.store_path.display()))?;
    let app = build_router(AppState::new(store, config.listing_errors));

    let addr = config.bind_addr().context("parsing bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    print_banner(addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("server stopped");
    Ok(())
}

/// Any routable address; only used to pick the outbound interface for the banner.
const LAN_ROUTE_TARGET: &str = "8.8.8.8:80";

/// Shown when the LAN address cannot be discovered.
const LAN_PLACEHOLDER: &str = "YOUR_LOCAL_IP";

fn print_banner(addr: SocketAddr) {
    let port = addr.port();
    let lan = lan_address()
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| LAN_PLACEHOLDER.to_string());

    if addr.ip().is_unspecified() {
        println!("🚀 Server running at http://127.0.0.1:{port} and http://{lan}:{port}");
    } else {
        println!("🚀 Server running at http://{addr}");
    }
}

// Address of the interface used for outbound traffic. connect() on UDP sends nothing.
fn lan_address() -> Option<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect(LAN_ROUTE_TARGET).ok()?;
    socket
        .local_addr()
        .ok()
        .map(|a| a.ip())
        .filter(|ip| !ip.is_unspecified())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
