//! Request gate (v1)
//!
//! Sits in front of a web application and decides, per request, whether to
//! answer a CORS preflight, forward with CORS headers (API traffic), or apply
//! session based authorization (everything else).
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────┐
//!                      │                  EDGE GATE                   │
//!   Client Request     │  ┌──────────┐   ┌────────────┐               │
//!   ───────────────────┼─▶│ http     │──▶│ classifier │               │
//!                      │  │ server   │   └─────┬──────┘               │
//!                      │  └──────────┘     API │    non-API           │
//!                      │              ┌────────┴───┐   ┌──────────┐   │
//!                      │              │    cors    │   │ matcher  │   │
//!                      │              └────────────┘   └────┬─────┘   │
//!                      │                                    ▼         │
//!                      │                              ┌──────────┐    │   Identity
//!                      │                              │auth gate │◀───┼── provider
//!                      │                              └────┬─────┘    │
//!   Client Response    │                                   ▼          │
//!   ◀──────────────────┼──── preflight / redirect / forward ───────────┼──▶ Application
//!                      └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use edge_gate::config::{self, validate_config, ConfigError, GateConfig};
use edge_gate::lifecycle::{shutdown_signal, Shutdown};
use edge_gate::observability::{logging, metrics};
use edge_gate::HttpServer;

#[derive(Parser)]
#[command(name = "edge-gate")]
#[command(about = "CORS and session gate in front of a web application", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults are used when omitted.
    #[arg(short, long, env = "EDGE_GATE_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => {
            let config = GateConfig::default();
            validate_config(&config).map_err(ConfigError::Validation)?;
            config
        }
    };

    logging::init_logging(&config.observability);
    tracing::info!("edge-gate v0.1.0 starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.address,
        api_prefix = %config.gate.api_prefix,
        session_endpoint = %config.identity.session_endpoint,
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

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
