//! Impact Classification
//!
//! Derives the sensor fusion index (SFI) from raw impact-module readings and
//! maps it onto the five ordered severity classes A-E.

mod classify;
mod error;
mod reading;
mod severity;

pub use classify::{classify, ClassSource, ClassifiedEvent};
pub use error::ReadingError;
pub use reading::Reading;
pub use severity::{
    LogStatus, SeverityClass, SeverityIndex, CRITICAL_THRESHOLD, DISPLAY_CEILING,
    MINOR_THRESHOLD, MODERATE_THRESHOLD, SEVERE_THRESHOLD,
};
