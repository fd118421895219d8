//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by upstream, status
//! - `proxy_request_duration_seconds` (histogram): latency by upstream
//! - `proxy_mirror_requests_total` (counter): mirror attempts by outcome
//! - `proxy_attribution_requests_total` (counter): attribution calls seen
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   exporter every call is a no-op
//! - Exporter is opt-in via configuration

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::routing::Upstream;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(
            address = %addr,
            error = %e,
            "Failed to install metrics exporter"
        ),
    }
}

/// Record a completed proxied request.
pub fn record_request(upstream: Upstream, status: u16, start: Instant) {
    metrics::counter!(
        "proxy_requests_total",
        "upstream" => upstream.as_str(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("proxy_request_duration_seconds", "upstream" => upstream.as_str())
        .record(start.elapsed().as_secs_f64());
}

/// Record one mirror attempt.
pub fn record_mirror(outcome: &'static str) {
    metrics::counter!("proxy_mirror_requests_total", "outcome" => outcome).increment(1);
}

pub fn record_attribution() {
    metrics::counter!("proxy_attribution_requests_total").increment(1);
}
