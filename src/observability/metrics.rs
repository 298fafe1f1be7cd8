//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define dispatcher metrics (requests, latency, startup faults)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `dispatcher_requests_total` (counter): dispatched requests by outcome
//! - `dispatcher_request_duration_seconds` (histogram): dispatch latency by outcome
//! - `dispatcher_registration_faults_total` (counter): components dropped at startup, by kind
//! - `dispatcher_routes` (gauge): size of the route table
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed, so tests need no setup
//! - Labels stay low-cardinality: outcome and fault kind only, never paths

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one dispatched request.
pub fn record_dispatch(outcome: &'static str, start: Instant) {
    ::metrics::counter!("dispatcher_requests_total", "outcome" => outcome).increment(1);
    ::metrics::histogram!("dispatcher_request_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

/// Record a component that failed to register.
pub fn record_registration_fault(kind: &'static str) {
    ::metrics::counter!("dispatcher_registration_faults_total", "kind" => kind).increment(1);
}

/// Record the size of the frozen route table.
pub fn record_route_count(routes: usize) {
    ::metrics::gauge!("dispatcher_routes").set(routes as f64);
}
