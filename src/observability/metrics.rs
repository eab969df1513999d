//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gate_decisions_total` (counter): decisions by `decision` label
//! - `gate_evaluation_duration_seconds` (histogram): time spent deciding
//! - `gate_identity_unavailable_total` (counter): identity provider faults
//! - `gate_upstream_errors_total` (counter): failed forwards to the application
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Prometheus exporter served on its own listener

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_decision(decision: &'static str, start: Instant) {
    metrics::counter!("gate_decisions_total", "decision" => decision).increment(1);
    metrics::histogram!("gate_evaluation_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_identity_unavailable() {
    metrics::counter!("gate_identity_unavailable_total").increment(1);
}

pub fn record_upstream_error() {
    metrics::counter!("gate_upstream_errors_total").increment(1);
}
