//! Impact Monitor
//!
//! Owns one monitoring session: each delivered reading is classified, logged
//! when at or above class B, and folded into the alert state. Driver and
//! operator actions go through the same session lock.

mod error;
mod session;

pub use error::MonitorError;
pub use session::{ImpactMonitor, MonitorConfig, MonitorUpdate, SessionStats};
