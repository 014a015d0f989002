//! ubirch gateway
//!
//! HTTP front-end that authenticates device submissions and hands them to a
//! signing processor.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request        ┌──────────────────────────────────────────────┐
//!     ──────────────────────┼─▶ net ──▶ http ──▶ auth ──▶ canonical        │
//!                           │  listener  router   table    JSON            │
//!                           │                                 │            │
//!                           │                                 ▼            │
//!     Client Response       │                          dispatch queue ─────┼──▶ processor
//!     ◀─────────────────────┼── http ◀── reply channel ◀───────────────────┼─── (echo or
//!                           │                                              │    embedded)
//!                           │  config · lifecycle · observability          │
//!                           └──────────────────────────────────────────────┘
//! ```
//!
//! Without `--config` the built-in defaults apply and the auth table is
//! empty, so every submission answers 404.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

use ubirch_gateway::config::{load_config, GatewayConfig};
use ubirch_gateway::dispatch::{processor, Dispatcher};
use ubirch_gateway::http::HttpServer;
use ubirch_gateway::lifecycle::{signals, Shutdown};
use ubirch_gateway::net;
use ubirch_gateway::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "ubirch-gateway", version)]
#[command(about = "Authenticating HTTP front-end for the ubirch signing service", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    logging::init(&config.observability.log_level);
    tracing::info!("ubirch-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    let auth = config.auth_table()?;
    tracing::info!(
        bind_address = %config.listener.bind_address,
        identities = auth.len(),
        identity_source = ?config.api.identity_source,
        prefix = %config.api.prefix,
        body_read_secs = config.timeouts.body_read_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    let (dispatcher, inbox) = Dispatcher::from_config(&config, shutdown.subscribe());
    let processor = tokio::spawn(processor::run(inbox, processor::echo));

    let tls = config.listener.tls.clone();
    let server = HttpServer::new(config, auth, dispatcher);

    match tls {
        Some(tls) => {
            let address = net::listener::bind_address(&server.config().listener)?;
            let rustls = net::tls::load_tls_config(&tls).await?;
            server.run_tls(address, rustls, shutdown.subscribe()).await?;
        }
        None => {
            let listener = net::bind(&server.config().listener).await?;
            server.run(listener, shutdown.subscribe()).await?;
        }
    }

    // The server owned the last dispatcher, so the queue is closed now.
    if let Err(e) = processor.await {
        tracing::error!(error = %e, "Processor task failed");
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
