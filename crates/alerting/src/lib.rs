//! Alerting System
//!
//! Tracks the single impact alert of a session: raising, escalation,
//! acknowledgement of the severe overlay, and driver resolution.

mod error;
mod manager;
mod state;

pub use error::AlertError;
pub use manager::{AlertManager, AlertStats};
pub use state::{
    AlertAction, AlertPhase, AlertState, AlertTransition, ClearCause, DriverResponse,
};
