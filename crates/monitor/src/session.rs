//! Monitoring session

use crate::error::MonitorError;
use alerting::{AlertError, AlertManager, AlertState, AlertStats, AlertTransition};
use chrono::{DateTime, Utc};
use classifier::{classify, ClassifiedEvent, Reading, ReadingError};
use event_log::EventLog;
use ingestion::ReadingSink;
use metrics::counter;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Number of events kept in the log
    pub log_capacity: usize,
    /// Updates buffered per observer before it starts lagging
    pub update_buffer: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            log_capacity: event_log::DEFAULT_CAPACITY,
            update_buffer: 64,
        }
    }
}

/// Result of one reading or action, as seen by observers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitorUpdate {
    /// Classified reading; `None` for driver/operator actions
    pub event: Option<ClassifiedEvent>,
    /// Whether the event went into the log
    pub logged: bool,
    pub alert: AlertState,
    pub transition: AlertTransition,
}

/// Session counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SessionStats {
    pub readings: u64,
    pub rejected: u64,
    pub logged: u64,
    pub alerts: AlertStats,
}

struct Session {
    current: Option<ClassifiedEvent>,
    log: EventLog,
    alerts: AlertManager,
    readings: u64,
    rejected: u64,
}

/// One impact monitoring session
///
/// Every reading runs classify, log append and alert transition under a
/// single lock, so concurrent deliveries are applied whole and in the order
/// they acquire it.
pub struct ImpactMonitor {
    id: Uuid,
    started_at: DateTime<Utc>,
    session: Mutex<Session>,
    updates: broadcast::Sender<MonitorUpdate>,
}

impl ImpactMonitor {
    /// Start a new session
    pub fn new(config: MonitorConfig) -> Self {
        let id = Uuid::new_v4();
        info!(
            "Starting impact monitor session {} (log capacity {})",
            id, config.log_capacity
        );

        let (updates, _) = broadcast::channel(config.update_buffer.max(1));
        Self {
            id,
            started_at: Utc::now(),
            session: Mutex::new(Session {
                current: None,
                log: EventLog::new(config.log_capacity.max(1)),
                alerts: AlertManager::new(),
                readings: 0,
                rejected: 0,
            }),
            updates,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Process one reading
    ///
    /// A malformed reading is reported and leaves the current event, the log
    /// and the alert exactly as they were.
    pub fn ingest(&self, reading: Reading) -> Result<MonitorUpdate, MonitorError> {
        let mut session = self.lock();

        let event = match classify(&reading) {
            Ok(event) => event,
            Err(e) => {
                warn!("Dropping malformed reading from {}: {}", reading.timestamp, e);
                return Err(Self::count_rejection(&mut session, e));
            }
        };

        session.readings += 1;
        counter!("impact_readings_total", "class" => event.severity_class.label()).increment(1);
        debug!(
            "Reading classified as {} (SFI {}, {:?})",
            event.severity_class, event.severity_index, event.class_source
        );

        let logged = session.log.append(event.clone());
        if logged {
            counter!("impact_log_entries_total").increment(1);
        }

        let transition = session.alerts.observe(&event);
        session.current = Some(event.clone());

        let update = MonitorUpdate {
            event: Some(event),
            logged,
            alert: session.alerts.state(),
            transition,
        };
        self.publish(&update);
        Ok(update)
    }

    /// Record a reading that failed before it could be built, e.g. an
    /// undecodable device payload
    pub fn reject(&self, error: ReadingError) -> MonitorError {
        warn!("Dropping malformed device payload: {}", error);
        Self::count_rejection(&mut self.lock(), error)
    }

    fn count_rejection(session: &mut Session, error: ReadingError) -> MonitorError {
        session.rejected += 1;
        counter!("impact_readings_rejected_total").increment(1);
        MonitorError::MalformedReading(error)
    }

    /// Most recent classified reading
    pub fn current_event(&self) -> Option<ClassifiedEvent> {
        self.lock().current.clone()
    }

    /// Log contents, newest first
    pub fn log_snapshot(&self) -> Vec<ClassifiedEvent> {
        self.lock().log.snapshot()
    }

    /// Log entries at or after `since`, newest first, at most `limit`
    pub fn log_query(&self, limit: usize, since: Option<DateTime<Utc>>) -> Vec<ClassifiedEvent> {
        let session = self.lock();
        match since {
            Some(since) => session.log.since(since).into_iter().take(limit).collect(),
            None => session.log.latest(limit),
        }
    }

    pub fn alert_state(&self) -> AlertState {
        self.lock().alerts.state()
    }

    pub fn stats(&self) -> SessionStats {
        let session = self.lock();
        SessionStats {
            readings: session.readings,
            rejected: session.rejected,
            logged: session.log.total_appended(),
            alerts: session.alerts.stats(),
        }
    }

    /// Driver confirms a false alarm
    pub fn confirm_false_alarm(&self) -> Result<AlertState, MonitorError> {
        self.act(AlertManager::confirm_false_alarm)
    }

    /// Driver requests emergency help (classes D/E)
    pub fn request_emergency_help(&self) -> Result<AlertState, MonitorError> {
        self.act(AlertManager::request_emergency_help)
    }

    /// Close a B/C prompt without resolving it
    pub fn dismiss_alert(&self) -> Result<AlertState, MonitorError> {
        self.act(AlertManager::dismiss)
    }

    /// Operator acknowledges the severe overlay
    pub fn acknowledge_alert(&self) -> Result<AlertState, MonitorError> {
        self.act(AlertManager::acknowledge)
    }

    /// Receive every update from now on
    pub fn subscribe_updates(&self) -> broadcast::Receiver<MonitorUpdate> {
        self.updates.subscribe()
    }

    fn act(
        &self,
        action: impl FnOnce(&mut AlertManager) -> Result<AlertTransition, AlertError>,
    ) -> Result<AlertState, MonitorError> {
        let mut session = self.lock();
        let transition = action(&mut session.alerts)?;
        let alert = session.alerts.state();

        self.publish(&MonitorUpdate {
            event: None,
            logged: false,
            alert,
            transition,
        });
        Ok(alert)
    }

    /// Broadcast while the session lock is held so observers see updates in
    /// processing order
    fn publish(&self, update: &MonitorUpdate) {
        if let Some((name, key, value)) = transition_counter(&update.transition) {
            counter!(name, key => value).increment(1);
        }
        // No observers is fine
        let _ = self.updates.send(update.clone());
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        // Session updates cannot panic half-way, so a poisoned lock still
        // holds consistent state
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ImpactMonitor {
    fn default() -> Self {
        Self::new(MonitorConfig::default())
    }
}

impl ReadingSink for ImpactMonitor {
    fn on_reading(&self, reading: Reading) {
        // Rejections are already logged and counted by `ingest`
        let _ = self.ingest(reading);
    }
}

/// Counter name and label for an alert transition
fn transition_counter(
    transition: &AlertTransition,
) -> Option<(&'static str, &'static str, &'static str)> {
    match *transition {
        AlertTransition::Unchanged => None,
        AlertTransition::Raised { class } => {
            Some(("impact_alerts_raised_total", "class", class.label()))
        }
        AlertTransition::Escalated { to, .. } => {
            Some(("impact_alert_escalations_total", "class", to.label()))
        }
        AlertTransition::Acknowledged { class } => {
            Some(("impact_alert_acknowledgements_total", "class", class.label()))
        }
        AlertTransition::Cleared { cause, .. } => {
            Some(("impact_alert_resolutions_total", "cause", cause.label()))
        }
    }
}
