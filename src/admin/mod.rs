//! Read-only status API.
//!
//! Exposes the current failover target to consumers outside the process.
//! Bound to loopback by default.

pub mod handlers;

use std::sync::Arc;
use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::cluster::ClusterRegistry;
use crate::failover::FailoverState;
use crate::lifecycle::ShutdownListener;
use self::handlers::*;

/// State injected into status handlers.
#[derive(Clone)]
pub struct AdminState {
    pub registry: Arc<ClusterRegistry>,
    pub failover: Arc<FailoverState>,
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/status", get(get_status))
        .route("/endpoints", get(get_endpoints))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the status API until shutdown fires.
pub async fn serve(
    listener: TcpListener,
    state: AdminState,
    mut shutdown: ShutdownListener,
) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "Status API listening");

    axum::serve(listener, setup_admin_router(state))
        .with_graceful_shutdown(async move {
            shutdown.recv().await;
        })
        .await?;

    tracing::info!("Status API stopped");
    Ok(())
}
