//! Edge router
//!
//! Receives every request for a domain and decides where it goes and whether
//! it is allowed through.
//!
//! # Architecture Overview
//!
//! ```text
//!                          ┌──────────────────────────────────────────────┐
//!                          │                 EDGE ROUTER                  │
//!   Client Request         │  ┌──────────┐   ┌──────────┐   ┌───────────┐ │
//!   ───────────────────────┼─▶│  http    │──▶│ routing  │──▶│ security  │ │
//!                          │  │ server   │   │ classify │   │rate limit │ │
//!                          │  └──────────┘   └──────────┘   └─────┬─────┘ │
//!                          │        ▲                            │       │
//!                          │        │                            ▼       │
//!   Client Response        │  ┌──────────┐   ┌──────────┐   ┌───────────┐ │
//!   ◀──────────────────────┼──│ response │◀──│ upstream │◀──│ dispatch  │ │──▶ static origin
//!                          │  │ headers  │   │  client  │   │           │ │──▶ legacy origin
//!                          │  └──────────┘   └──────────┘   └───────────┘ │
//!                          │                                              │
//!                          │   store (local map | durable KV) · config    │
//!                          │   observability · lifecycle                  │
//!                          └──────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use edge_router::config::{load_config, validation::validate_config, ConfigError, EdgeConfig};
use edge_router::lifecycle::{wait_for_signal, Shutdown};
use edge_router::net::load_tls_config;
use edge_router::observability::{logging, metrics};
use edge_router::HttpServer;

#[derive(Parser)]
#[command(name = "edge-router")]
#[command(about = "Edge reverse proxy with per-client rate limiting", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => {
            let config = EdgeConfig::default();
            validate_config(&config).map_err(ConfigError::Validation)?;
            config
        }
    };

    if cli.check {
        println!("Configuration OK");
        return Ok(());
    }

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "edge-router starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        static_origin = %config.origins.static_origin,
        legacy_origin = %config.origins.legacy_origin,
        section_root = %config.routing.section_root,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            wait_for_signal().await;
            shutdown.trigger();
        });
    }

    let tls = config.listener.tls.clone();
    let bind_address = config.listener.bind_address.clone();
    let server = HttpServer::new(config);

    match tls {
        Some(tls) => {
            let addr: SocketAddr = bind_address.parse()?;
            let rustls = load_tls_config(&tls).await?;
            server.run_tls(addr, rustls, server_shutdown).await?;
        }
        None => {
            let listener = TcpListener::bind(&bind_address).await?;
            server.run(listener, server_shutdown).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
