//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Honor `RUST_LOG` first, then the configured level

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Directive used when `RUST_LOG` is not set.
pub fn default_directive(level: &str) -> String {
    format!("relay_server={level},tower_http={level}", level = level)
}

/// Install the global subscriber.
///
/// Fails if a subscriber is already installed.
pub fn init(level: &str) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directive(level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}
