//! Appointment status transitions
//!
//! ```text
//! Upcoming --complete--> Completed
//! Upcoming --cancel----> Cancelled
//! ```
//!
//! Completed and Cancelled are terminal.

use crate::types::AppointmentStatus;
use serde::{Deserialize, Serialize};

/// Returned when a transition is not part of the lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("illegal transition {from} -> {to}")]
pub struct IllegalTransition {
    /// Current status
    pub from: AppointmentStatus,
    /// Requested status
    pub to: AppointmentStatus,
}

/// How strictly the lifecycle engine applies the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionPolicy {
    /// Reject unknown ids and transitions out of terminal states
    #[default]
    Strict,
    /// Overwrite status unconditionally; unknown ids are silent no-ops
    Lenient,
}

/// Validates a state transition.
///
/// # Errors
/// Returns `IllegalTransition` unless `to` is reachable from `from` in one step
pub fn validate_transition(
    from: AppointmentStatus,
    to: AppointmentStatus,
) -> Result<(), IllegalTransition> {
    if allowed(from, to) {
        Ok(())
    } else {
        Err(IllegalTransition { from, to })
    }
}

/// Statuses reachable from `from` in one step
#[must_use]
pub fn allowed_transitions(from: AppointmentStatus) -> Vec<AppointmentStatus> {
    use AppointmentStatus::*;
    match from {
        Upcoming => vec![Completed, Cancelled],
        Completed => vec![],
        Cancelled => vec![],
    }
}

fn allowed(from: AppointmentStatus, to: AppointmentStatus) -> bool {
    allowed_transitions(from).into_iter().any(|s| s == to)
}
