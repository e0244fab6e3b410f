//! Reading Error Types

use thiserror::Error;

/// Reasons a reading is refused before classification
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReadingError {
    /// NaN or infinite sensor value
    #[error("{field} value {value} is not finite")]
    NonFinite { field: &'static str, value: f64 },

    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Device label outside A-E
    #[error("Unknown severity label: {0:?}")]
    UnknownLabel(String),
}
