//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (relay counters and latency histograms)
//!
//! Consumers:
//!     → stdout (fmt subscriber)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Request ID (x-request-id) is attached to every inbound request span
//! - Metrics go through the `metrics` facade; without an installed recorder
//!   they are no-ops, which keeps tests free of global state

pub mod logging;
pub mod metrics;
