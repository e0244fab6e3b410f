//! Impact Event Log
//!
//! Bounded, newest-first history of classified events at or above class B.
//! Retention is in-memory only and does not survive a restart.

mod log;

pub use log::{EventLog, DEFAULT_CAPACITY};
