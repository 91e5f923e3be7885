//! Cluster topology.
//!
//! # Data Flow
//! ```text
//! [[endpoints]] config
//!     → registry.rs (parse URLs, keep order)
//!     → endpoint.rs (id + health URL + connection URL)
//!     → read by failover controller and status API
//! ```
//!
//! # Design Decisions
//! - Registry is built once at startup and never mutated
//! - Order matters: the failover candidate is the next endpoint, wrapping

pub mod endpoint;
pub mod registry;

pub use endpoint::{Endpoint, EndpointId};
pub use registry::{ClusterRegistry, RegistryError};
