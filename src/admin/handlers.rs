use axum::{extract::State, Json};
use serde::Serialize;

use crate::admin::AdminState;
use crate::cluster::EndpointId;
use crate::failover::FailoverSnapshot;

#[derive(Debug, Serialize)]
pub struct EndpointStatus {
    pub name: EndpointId,
    pub health_url: String,
    pub connection_url: String,
    pub active: bool,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<FailoverSnapshot> {
    Json(state.failover.snapshot())
}

pub async fn get_endpoints(State(state): State<AdminState>) -> Json<Vec<EndpointStatus>> {
    let active = state.failover.active_id();

    let statuses = state
        .registry
        .iter()
        .map(|e| EndpointStatus {
            name: e.id().clone(),
            health_url: e.health_url().to_string(),
            connection_url: e.connection_url().to_string(),
            active: *e.id() == active,
        })
        .collect();

    Json(statuses)
}

/// Liveness of the monitor process itself.
pub async fn healthz() -> &'static str {
    "ok"
}
