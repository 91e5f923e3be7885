//! Failover subsystem.
//!
//! # Data Flow
//! ```text
//! controller.rs (single writer, background task)
//!     → probe active endpoint every interval
//!     → on sustained failure, probe candidate
//!     → state.rs (atomic swap of active id + connection URL)
//!
//! Readers (status API, application code):
//!     → FailoverState::current_target()
//! ```
//!
//! # Design Decisions
//! - State is injected via `Arc`, never a global
//! - One controller parameterized by endpoint URL pairs
//! - The loop is cancelled through the shutdown listener

pub mod controller;
pub mod state;

pub use controller::{FailoverController, MonitorSettings, TickOutcome};
pub use state::{ActiveTarget, FailoverSnapshot, FailoverState};
