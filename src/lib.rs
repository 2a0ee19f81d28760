//! HTTP relay server library.
//!
//! Accepts descriptions of outbound requests, resolves a service identifier to
//! a configured upstream base URL, forwards the request and returns the
//! upstream's status, headers, body and latency as a JSON document.

pub mod client;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod registry;
pub mod relay;

pub use config::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use registry::ServiceRegistry;
pub use relay::{RelayError, RelayRequest, RelayResponse, Relayer};
