//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define balancer metrics (dispatches, latency, connections, failures)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `balancer_dispatch_total` (counter): dispatches by strategy, backend
//! - `balancer_dispatch_latency_seconds` (histogram): decision latency by backend
//! - `balancer_active_connections` (gauge): current count by backend
//! - `balancer_pipelines_total` (counter): hardware pipelines created by kind
//! - `balancer_provisioning_failures_total` (counter): failures by target
//! - `balancer_releases_total` (counter): releases by outcome
//!
//! # Design Decisions
//! - Updates are no-ops until a recorder is installed
//! - The in-process monitor view is separate (`load_balancer::stats`)

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::load_balancer::backend::Backend;

/// Install the Prometheus recorder and its scrape listener.
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Prometheus metrics exporter listening");
    Ok(())
}

pub fn record_dispatch(strategy: &'static str, backend: &Backend, latency: Duration) {
    counter!(
        "balancer_dispatch_total",
        "strategy" => strategy,
        "backend" => backend.to_string()
    )
    .increment(1);
    histogram!("balancer_dispatch_latency_seconds", "backend" => backend.to_string())
        .record(latency.as_secs_f64());
}

pub fn record_pipeline(kind: &'static str) {
    counter!("balancer_pipelines_total", "kind" => kind).increment(1);
}

pub fn record_provisioning_failure(target: &str) {
    counter!("balancer_provisioning_failures_total", "target" => target.to_string()).increment(1);
}

pub fn record_release(outcome: &'static str) {
    counter!("balancer_releases_total", "outcome" => outcome).increment(1);
}

pub fn set_active_connections(backend: &Backend, count: u64) {
    gauge!("balancer_active_connections", "backend" => backend.to_string()).set(count as f64);
}
