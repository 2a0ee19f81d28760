//! Relay server (v1)
//!
//! A single-endpoint HTTP relay built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client ──POST /relay──▶ ┌──────────┐   ┌──────────┐   ┌──────────┐
//!                             │   http   │──▶│  relay   │──▶│ upstream │
//!     Client ◀──RelayResponse─│  server  │◀──│ handler  │◀──│ service  │
//!                             └──────────┘   └────┬─────┘   └──────────┘
//!                                                 │
//!                                          ┌──────┴─────┐
//!                                          │  registry  │  (name → base URL)
//!                                          └────────────┘
//! ```

use relay_server::config;
use relay_server::lifecycle;
use relay_server::observability::logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine; the environment may be set directly.
    let _ = dotenvy::dotenv();

    let config = config::load_from_env()?;

    logging::init(&config.observability.log_level)?;

    tracing::info!("relay-server v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        services = ?config.services.0.keys().collect::<Vec<_>>(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    lifecycle::start(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
