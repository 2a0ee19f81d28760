//! Startup orchestration.
//!
//! # Responsibilities
//! - Start the metrics exporter when enabled
//! - Build the HTTP server from a validated config
//! - Bind the listener and serve until a shutdown signal arrives

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::RelayConfig;
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;

/// Fatal errors raised while starting the relay.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Invalid address '{0}'")]
    Address(String),

    #[error("Failed to start metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("Failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Run the relay with `config` until SIGINT/SIGTERM.
pub async fn start(config: RelayConfig) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        let addr = parse_addr(&config.observability.metrics_address)?;
        metrics::init_metrics(addr)?;
    }

    let bind_addr = parse_addr(&config.listener.bind_address)?;
    let server = HttpServer::new(config)?;

    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;
    Ok(())
}

fn parse_addr(raw: &str) -> Result<SocketAddr, StartupError> {
    raw.parse()
        .map_err(|_| StartupError::Address(raw.to_string()))
}
