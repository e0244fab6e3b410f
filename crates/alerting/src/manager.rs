//! Alert Manager Implementation

use crate::error::AlertError;
use crate::state::{AlertAction, AlertState, AlertTransition, ClearCause};
use chrono::Utc;
use classifier::ClassifiedEvent;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Counters over the life of a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertStats {
    /// Alerts raised from idle
    pub raised: u64,
    /// Escalations of an unresolved alert
    pub escalations: u64,
    /// Severe overlays acknowledged
    pub acknowledged: u64,
    pub false_alarms: u64,
    pub emergencies: u64,
    pub dismissals: u64,
    /// Alerts cleared by a class A reading
    pub baseline_resolutions: u64,
}

impl AlertStats {
    fn record(&mut self, transition: &AlertTransition) {
        match transition {
            AlertTransition::Unchanged => {}
            AlertTransition::Raised { .. } => self.raised += 1,
            AlertTransition::Escalated { .. } => self.escalations += 1,
            AlertTransition::Acknowledged { .. } => self.acknowledged += 1,
            AlertTransition::Cleared { cause, .. } => match cause {
                ClearCause::FalseAlarm => self.false_alarms += 1,
                ClearCause::EmergencyRequested => self.emergencies += 1,
                ClearCause::Dismissed => self.dismissals += 1,
                ClearCause::BaselineRestored => self.baseline_resolutions += 1,
            },
        }
    }
}

/// Owns the session's alert state and records every transition
#[derive(Debug, Default)]
pub struct AlertManager {
    state: AlertState,
    stats: AlertStats,
}

impl AlertManager {
    /// Create a manager in the idle state
    pub fn new() -> Self {
        Self::default()
    }

    /// Current alert state
    pub fn state(&self) -> AlertState {
        self.state
    }

    pub fn stats(&self) -> AlertStats {
        self.stats
    }

    /// Fold a classified event into the alert
    pub fn observe(&mut self, event: &ClassifiedEvent) -> AlertTransition {
        let (next, transition) = self.state.observe(event);
        self.commit(next, transition);
        transition
    }

    /// Driver marks the alert as a false alarm
    pub fn confirm_false_alarm(&mut self) -> Result<AlertTransition, AlertError> {
        self.apply(AlertAction::ConfirmFalseAlarm)
    }

    /// Driver requests emergency help
    pub fn request_emergency_help(&mut self) -> Result<AlertTransition, AlertError> {
        self.apply(AlertAction::RequestEmergencyHelp)
    }

    /// Close a B/C prompt without resolving it
    pub fn dismiss(&mut self) -> Result<AlertTransition, AlertError> {
        self.apply(AlertAction::Dismiss)
    }

    /// Operator acknowledges the severe overlay
    pub fn acknowledge(&mut self) -> Result<AlertTransition, AlertError> {
        self.apply(AlertAction::Acknowledge)
    }

    fn apply(&mut self, action: AlertAction) -> Result<AlertTransition, AlertError> {
        let current = self.state;
        let result = match action {
            AlertAction::ConfirmFalseAlarm => current.confirm_false_alarm(Utc::now()),
            AlertAction::RequestEmergencyHelp => current.request_emergency_help(Utc::now()),
            AlertAction::Dismiss => current.dismiss(),
            AlertAction::Acknowledge => current.acknowledge(),
        };

        let next = match result {
            Ok(next) => next,
            Err(e) => {
                debug!("Alert action rejected: {}", e);
                return Err(e);
            }
        };

        // Every accepted action starts from an unresolved alert
        let transition = match (current.active_class, action) {
            (Some(class), AlertAction::Acknowledge) => AlertTransition::Acknowledged { class },
            (Some(class), AlertAction::ConfirmFalseAlarm) => AlertTransition::Cleared {
                class,
                cause: ClearCause::FalseAlarm,
            },
            (Some(class), AlertAction::RequestEmergencyHelp) => AlertTransition::Cleared {
                class,
                cause: ClearCause::EmergencyRequested,
            },
            (Some(class), AlertAction::Dismiss) => AlertTransition::Cleared {
                class,
                cause: ClearCause::Dismissed,
            },
            (None, _) => AlertTransition::Unchanged,
        };

        self.commit(next, transition);
        Ok(transition)
    }

    fn commit(&mut self, next: AlertState, transition: AlertTransition) {
        match transition {
            AlertTransition::Unchanged => {}
            AlertTransition::Raised { class } if class.is_severe() => {
                warn!("Severe impact alert raised: class {}", class);
            }
            AlertTransition::Raised { class } => {
                info!("Impact alert raised: class {}", class);
            }
            AlertTransition::Escalated { from, to } => {
                warn!("Impact alert escalated: class {} -> {}", from, to);
            }
            AlertTransition::Acknowledged { class } => {
                info!("Severe overlay acknowledged for class {}", class);
            }
            AlertTransition::Cleared { class, cause } => {
                info!("Impact alert for class {} cleared: {:?}", class, cause);
            }
        }

        self.stats.record(&transition);
        self.state = next;
    }
}
