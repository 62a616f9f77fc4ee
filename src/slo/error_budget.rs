//! SLO error budget
//!
//! Read verbatim from the SLO API. Values are informational; nothing here
//! enforces their ranges.

use serde::{Deserialize, Serialize};

/// Error budget of a service-level objective
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBudget {
    /// The initial error budget, as 1 - objective
    pub initial: f64,
    /// The error budget consumed, as a percentage of the initial value
    pub consumed: f64,
    /// The error budget remaining, as a percentage of the initial value
    pub remaining: f64,
    /// Only for SLOs with the occurrences budgeting method and a
    /// calendar-aligned time window
    pub is_estimated: bool,
}

impl ErrorBudget {
    pub fn new(initial: f64, consumed: f64, remaining: f64, is_estimated: bool) -> Self {
        Self {
            initial,
            consumed,
            remaining,
            is_estimated,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining <= 0.0
    }
}
