//! Health-check driven failover between redundant sync-gateway endpoints.

pub mod admin;
pub mod cluster;
pub mod config;
pub mod failover;
pub mod health;
pub mod lifecycle;
pub mod observability;

pub use cluster::{ClusterRegistry, Endpoint, EndpointId};
pub use config::FailoverConfig;
pub use failover::{FailoverController, FailoverState, TickOutcome};
pub use health::{HealthVerdict, HttpProber, Prober};
pub use lifecycle::Shutdown;
