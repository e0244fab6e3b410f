//! Alert Error Types

use crate::state::{AlertAction, AlertPhase};
use classifier::SeverityClass;
use thiserror::Error;

/// Errors from driver or operator actions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlertError {
    /// Action not valid for the current alert
    #[error("{action} is not permitted in phase {phase:?} (active class: {active_class:?})")]
    InvalidTransition {
        action: AlertAction,
        phase: AlertPhase,
        active_class: Option<SeverityClass>,
    },
}
