//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware: request ID, tracing, timeout, limits)
//!     → request.rs (decode + validate RelayRequest documents)
//!     → handlers.rs (health, services, relay)
//!     → relay::Relayer (outbound call)
//!     → response.rs (JSON documents back to the caller)
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::{RelayPayload, X_REQUEST_ID};
pub use response::{HealthStatus, ServicesListing};
pub use server::{AppState, HttpServer};
