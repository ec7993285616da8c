//! Metrics collection and exposition.
//!
//! # Metrics
//! - `host_router_requests_total` (counter): routing decisions by `decision`
//! - `host_router_auth_rejections_total` (counter): rejected requests by `reason`
//! - `host_router_upstream_requests_total` (counter): upstream responses by `status`
//! - `host_router_request_duration_seconds` (histogram): end-to-end latency
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Labels are low-cardinality; tenant labels are never recorded

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder with an HTTP scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_decision(decision: &'static str) {
    counter!("host_router_requests_total", "decision" => decision).increment(1);
}

pub fn record_auth_rejection(reason: &'static str) {
    counter!("host_router_auth_rejections_total", "reason" => reason).increment(1);
}

pub fn record_upstream(status: u16) {
    counter!("host_router_upstream_requests_total", "status" => status.to_string()).increment(1);
}

pub fn record_request_duration(start: Instant) {
    histogram!("host_router_request_duration_seconds").record(start.elapsed().as_secs_f64());
}
