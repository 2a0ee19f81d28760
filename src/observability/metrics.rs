//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): relays by service, method, status
//! - `relay_upstream_duration_seconds` (histogram): upstream latency by
//!   service, for calls that produced a response
//!
//! Failed relays are counted under the status returned to the caller
//! (404, 502 or 504).

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Count one finished relay.
pub fn record_relay(service: &str, method: &str, status: u16) {
    metrics::counter!(
        "relay_requests_total",
        "service" => service.to_string(),
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record the time an upstream took to answer, body included.
pub fn record_upstream_duration(service: &str, elapsed: Duration) {
    metrics::histogram!("relay_upstream_duration_seconds", "service" => service.to_string())
        .record(elapsed.as_secs_f64());
}

/// Install the Prometheus recorder and serve it on `addr`.
///
/// Must be called from within a tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}
