//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Failover controller tick
//!     → prober.rs (HEAD health-check URL, bounded timeout)
//!     → verdict.rs (Healthy / Unhealthy)
//!     → controller updates failure counter
//! ```
//!
//! # Design Decisions
//! - Only 200 OK is healthy; any other status is a failure
//! - Timeouts, refused connections, DNS and TLS errors are failures
//! - Errors never cross the prober boundary

pub mod prober;
pub mod verdict;

pub use prober::{HttpProber, Prober};
pub use verdict::HealthVerdict;
