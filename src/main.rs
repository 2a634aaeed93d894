//! Forwarding gateway binary.
//!
//! Accepts REST calls on `/api/proxy/{*path}` and relays them onto a single
//! versioned upstream API, replicating the upstream's status, content-type,
//! headers, and body back to the caller.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use graph_gateway::config::{load_config, GatewayConfig};
use graph_gateway::observability::metrics;
use graph_gateway::proxy::Forwarder;
use graph_gateway::upstream::UpstreamClient;
use graph_gateway::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "graph-gateway")]
#[command(about = "Catch-all forwarding gateway for a versioned upstream API", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file (defaults apply when omitted).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "graph_gateway=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("graph-gateway v0.1.0 starting");

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream_endpoint = %config.upstream.endpoint,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // Constructed once, shared read-only across all request handlers.
    let client = UpstreamClient::new(&config.upstream, &config.timeouts)?;
    let forwarder = Forwarder::new(client);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_shutdown.trigger();
        }
    });

    let server = HttpServer::new(config, forwarder);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
