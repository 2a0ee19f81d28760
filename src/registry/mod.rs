//! Service registry subsystem.
//!
//! # Data Flow
//! ```text
//! RELAY_SERVICES / [services] table
//!     → parser.rs (JSON object or name=url pairs)
//!     → services.rs (ServiceRegistry, immutable)
//!     → shared via Arc with the relay handler
//! ```
//!
//! # Design Decisions
//! - Built once at startup, never mutated
//! - Base URLs are stored exactly as configured so `/services` echoes them back

pub mod parser;
pub mod services;

pub use parser::{parse_services, ServiceParseError};
pub use services::{RegistryError, ServiceRegistry};
