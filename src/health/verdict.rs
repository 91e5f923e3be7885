//! Probe verdicts.

use serde::Serialize;
use std::fmt;

/// Outcome of a single health probe.
///
/// Transport failures are folded into `Unhealthy`; a verdict is data, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthVerdict {
    Healthy,
    Unhealthy,
}

impl HealthVerdict {
    pub fn is_healthy(self) -> bool {
        self == HealthVerdict::Healthy
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HealthVerdict::Healthy => "healthy",
            HealthVerdict::Unhealthy => "unhealthy",
        }
    }
}

impl fmt::Display for HealthVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
