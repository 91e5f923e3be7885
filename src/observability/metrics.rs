//! Metrics collection and exposition.
//!
//! # Metrics
//! - `failover_probe_total` (counter): probes by endpoint, verdict
//! - `failover_endpoint_health` (gauge): 1=healthy, 0=unhealthy
//! - `failover_consecutive_failures` (gauge): current failure streak
//! - `failover_attempts_total` (counter): attempts by from, to, outcome
//! - `failover_active_endpoint` (gauge): 1 for the active endpoint
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::cluster::{ClusterRegistry, EndpointId};
use crate::health::HealthVerdict;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;

    describe_counter!("failover_probe_total", "Health probes issued, by endpoint and verdict");
    describe_gauge!("failover_endpoint_health", "Last probe verdict per endpoint (1=healthy)");
    describe_gauge!("failover_consecutive_failures", "Consecutive failed probes of the active endpoint");
    describe_counter!("failover_attempts_total", "Failover attempts, by outcome");
    describe_gauge!("failover_active_endpoint", "1 for the endpoint currently advertised");

    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_probe(endpoint: &EndpointId, verdict: HealthVerdict) {
    counter!(
        "failover_probe_total",
        "endpoint" => endpoint.to_string(),
        "verdict" => verdict.as_str()
    )
    .increment(1);
    gauge!("failover_endpoint_health", "endpoint" => endpoint.to_string())
        .set(if verdict.is_healthy() { 1.0 } else { 0.0 });
}

pub fn record_consecutive_failures(count: u32) {
    gauge!("failover_consecutive_failures").set(f64::from(count));
}

pub fn record_failover_attempt(from: &EndpointId, to: &EndpointId, switched: bool) {
    counter!(
        "failover_attempts_total",
        "from" => from.to_string(),
        "to" => to.to_string(),
        "outcome" => if switched { "switched" } else { "aborted" }
    )
    .increment(1);
}

pub fn record_active_endpoint(registry: &ClusterRegistry, active: &EndpointId) {
    for endpoint in registry.iter() {
        let value = if endpoint.id() == active { 1.0 } else { 0.0 };
        gauge!("failover_active_endpoint", "endpoint" => endpoint.id().to_string()).set(value);
    }
}
