//! Monitor Error Types

use alerting::AlertError;
use classifier::ReadingError;
use thiserror::Error;

/// Errors surfaced by the monitoring session
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MonitorError {
    /// Reading refused; session state untouched
    #[error("Malformed reading: {0}")]
    MalformedReading(#[from] ReadingError),

    /// Action not allowed for the current alert
    #[error("Invalid transition: {0}")]
    InvalidTransition(#[from] AlertError),
}
