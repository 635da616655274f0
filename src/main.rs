//! Album gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client                ┌──────────────────────────────────────────────┐
//!     GET /albums ─────────▶│ http::server ──▶ albums::AlbumService        │
//!                           │                        │                     │
//!                           │                        ▼                     │
//!                           │            resilience::BreakerRegistry       │
//!                           │                 "albums" breaker             │
//!                           │             closed/half-open │ open          │
//!                           │                        ▼     └──▶ default    │
//!                           │              upstream::UpstreamClient   list │
//!                           └────────────────────────┼─────────────────────┘
//!                                                    ▼
//!                                      jsonplaceholder.typicode.com/albums
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use album_gateway::config::{load_config, GatewayConfig};
use album_gateway::http::{HttpServer, ServerError};
use album_gateway::lifecycle::{signals, Shutdown};
use album_gateway::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "album-gateway")]
#[command(about = "Album listing service guarded by a circuit breaker", long_about = None)]
struct Args {
    /// TOML configuration file; built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config_file = ?args.config,
        "album-gateway starting"
    );
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.url,
        timeout_secs = config.upstream.timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr).map_err(ServerError::from)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    signals::wait_for_shutdown_signal().await;
    shutdown.trigger();
    server_task.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}
