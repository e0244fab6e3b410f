//! Event Log Implementation

use chrono::{DateTime, Utc};
use classifier::{ClassifiedEvent, SeverityClass};
use std::collections::VecDeque;
use tracing::debug;

/// Default number of retained events
pub const DEFAULT_CAPACITY: usize = 50;

/// Bounded log of classified events, newest first
///
/// Only events of class B and above are retained. Once full, each append
/// evicts the oldest entry.
#[derive(Debug, Clone)]
pub struct EventLog {
    /// Front is the most recent entry
    entries: VecDeque<ClassifiedEvent>,
    /// Maximum number of entries
    capacity: usize,
    /// Total events accepted since creation
    total_appended: u64,
}

impl EventLog {
    /// Create a log with the given capacity
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Event log capacity must be > 0");
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            total_appended: 0,
        }
    }

    /// Create a log holding the last 50 events
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }

    /// Append an event; returns whether it was retained
    ///
    /// Class A events are ignored without touching the existing entries.
    pub fn append(&mut self, event: ClassifiedEvent) -> bool {
        if event.severity_class == SeverityClass::A {
            return false;
        }

        self.entries.push_front(event);
        if self.entries.len() > self.capacity {
            if let Some(evicted) = self.entries.pop_back() {
                debug!("Evicted log entry from {}", evicted.timestamp);
            }
        }
        self.total_appended += 1;
        true
    }

    /// Copy of the entries, newest first
    pub fn snapshot(&self) -> Vec<ClassifiedEvent> {
        self.entries.iter().cloned().collect()
    }

    /// Copy of the newest `limit` entries
    pub fn latest(&self, limit: usize) -> Vec<ClassifiedEvent> {
        self.entries.iter().take(limit).cloned().collect()
    }

    /// Entries at or after `since`, newest first
    pub fn since(&self, since: DateTime<Utc>) -> Vec<ClassifiedEvent> {
        self.entries
            .iter()
            .filter(|e| e.timestamp >= since)
            .cloned()
            .collect()
    }

    /// Most recent entry
    pub fn newest(&self) -> Option<&ClassifiedEvent> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Events accepted since creation, including evicted ones
    pub fn total_appended(&self) -> u64 {
        self.total_appended
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}
