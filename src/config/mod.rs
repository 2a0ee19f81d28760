//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! .env file (optional, loaded by main)
//!     → RELAY_CONFIG_FILE (optional TOML)
//!     → loader.rs (parse, apply RELAY_* overrides)
//!     → validation.rs (semantic checks)
//!     → RelayConfig (validated, immutable)
//!     → handed to HttpServer::new
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_from_env, load_with, ConfigError};
pub use schema::LimitsConfig;
pub use schema::ListenerConfig;
pub use schema::ObservabilityConfig;
pub use schema::RelayConfig;
pub use schema::ServicesConfig;
pub use schema::TimeoutConfig;
