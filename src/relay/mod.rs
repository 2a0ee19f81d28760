//! Relay subsystem.
//!
//! # Data Flow
//! ```text
//! RelayRequest (validated at deserialization)
//!     → handler.rs (registry lookup, outbound call)
//!     → upstream service
//!     → handler.rs (JSON-or-text body, headers, latency)
//!     → RelayResponse | RelayError (404 / 502 / 504)
//! ```
//!
//! # Design Decisions
//! - Unknown services fail before any network activity
//! - No retries; the first outcome is returned
//! - Upstream redirects are returned, not followed

pub mod error;
pub mod handler;
pub mod types;

pub use error::RelayError;
pub use handler::Relayer;
pub use types::{
    HttpMethod, RelayBody, RelayRequest, RelayResponse, RequestValidationError, ResponseBody,
};
