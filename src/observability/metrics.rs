//! Metrics collection and exposition.
//!
//! # Metrics
//! - `balancer_requests_total` (counter): requests by status
//! - `balancer_upstream_duration_seconds` (histogram): forward latency by endpoint
//! - `balancer_upstream_failures_total` (counter): transport failures by endpoint
//! - `balancer_pool_available` (gauge): free endpoints in the pool
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Instant;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_request(status: u16) {
    counter!("balancer_requests_total", "status" => status.to_string()).increment(1);
}

pub fn record_upstream(endpoint: &str, start: Instant) {
    histogram!("balancer_upstream_duration_seconds", "endpoint" => endpoint.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_upstream_failure(endpoint: &str) {
    counter!("balancer_upstream_failures_total", "endpoint" => endpoint.to_string()).increment(1);
}

pub fn record_pool_available(available: usize) {
    gauge!("balancer_pool_available").set(available as f64);
}
