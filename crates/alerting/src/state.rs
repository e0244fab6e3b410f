//! Alert state and its transitions
//!
//! `AlertState` is a plain value. Every transition consumes the current state
//! and returns the next one, so the owner decides where the state lives.

use crate::error::AlertError;
use chrono::{DateTime, Utc};
use classifier::{ClassifiedEvent, SeverityClass};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle phase of the current alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AlertPhase {
    /// No unresolved alert
    #[default]
    Idle,
    /// Unresolved class D/E alert with the severe overlay showing
    Active,
    /// Unresolved alert waiting on the driver, overlay silenced or class B/C
    AwaitingDriverResponse,
}

/// Driver's answer to the confirmation prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverResponse {
    #[default]
    Unconfirmed,
    FalseAlarmConfirmed,
    EmergencyRequested,
}

/// Actions taken from the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertAction {
    ConfirmFalseAlarm,
    RequestEmergencyHelp,
    Dismiss,
    Acknowledge,
}

impl fmt::Display for AlertAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AlertAction::ConfirmFalseAlarm => "confirm false alarm",
            AlertAction::RequestEmergencyHelp => "request emergency help",
            AlertAction::Dismiss => "dismiss",
            AlertAction::Acknowledge => "acknowledge",
        };
        f.write_str(name)
    }
}

/// Why an unresolved alert went back to idle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearCause {
    FalseAlarm,
    EmergencyRequested,
    /// B/C prompt closed without an answer
    Dismissed,
    /// A class A reading arrived
    BaselineRestored,
}

impl ClearCause {
    /// Stable label for logs and metrics
    pub fn label(&self) -> &'static str {
        match self {
            ClearCause::FalseAlarm => "false_alarm",
            ClearCause::EmergencyRequested => "emergency_requested",
            ClearCause::Dismissed => "dismissed",
            ClearCause::BaselineRestored => "baseline_restored",
        }
    }
}

/// What a single step did to the alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlertTransition {
    Unchanged,
    Raised {
        class: SeverityClass,
    },
    Escalated {
        from: SeverityClass,
        to: SeverityClass,
    },
    /// Severe overlay silenced, driver answer still outstanding
    Acknowledged {
        class: SeverityClass,
    },
    Cleared {
        class: SeverityClass,
        cause: ClearCause,
    },
}

/// The single alert tracked for a session
///
/// `active_class` is `Some` exactly when `phase` is not `Idle`. `Active` is
/// only reachable with class D or E.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AlertState {
    pub phase: AlertPhase,
    pub active_class: Option<SeverityClass>,
    pub driver_response: DriverResponse,
    /// When the current alert was raised or last escalated
    pub raised_at: Option<DateTime<Utc>>,
    /// When the driver gave `driver_response`
    pub responded_at: Option<DateTime<Utc>>,
}

impl AlertState {
    /// Fresh idle state
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an alert is still unresolved
    pub fn is_unresolved(&self) -> bool {
        self.phase != AlertPhase::Idle
    }

    /// Severe overlay surface (classes D/E until acknowledged)
    pub fn severe_overlay_visible(&self) -> bool {
        self.phase == AlertPhase::Active
    }

    /// Driver confirmation prompt surface (classes B-E)
    pub fn confirmation_prompt_visible(&self) -> bool {
        self.is_unresolved()
    }

    /// Emergency help is only offered for severe alerts
    pub fn emergency_available(&self) -> bool {
        self.is_unresolved() && self.active_class.is_some_and(|c| c.is_severe())
    }

    /// Plain dismissal is only allowed for B/C alerts
    pub fn dismissable(&self) -> bool {
        self.is_unresolved() && self.active_class.is_some_and(|c| !c.is_severe())
    }

    /// Fold a classified event into the state
    pub fn observe(self, event: &ClassifiedEvent) -> (Self, AlertTransition) {
        let class = event.severity_class;

        match self.active_class {
            None if class.is_alerting() => (
                Self::raised(class, event.timestamp),
                AlertTransition::Raised { class },
            ),
            None => (self, AlertTransition::Unchanged),
            Some(active) if !class.is_alerting() => (
                self.cleared(),
                AlertTransition::Cleared {
                    class: active,
                    cause: ClearCause::BaselineRestored,
                },
            ),
            Some(active) if class > active => (
                Self::raised(class, event.timestamp),
                AlertTransition::Escalated {
                    from: active,
                    to: class,
                },
            ),
            Some(_) => (self, AlertTransition::Unchanged),
        }
    }

    /// Driver confirms the alert was a false alarm at `at`
    pub fn confirm_false_alarm(self, at: DateTime<Utc>) -> Result<Self, AlertError> {
        if !self.is_unresolved() {
            return Err(self.reject(AlertAction::ConfirmFalseAlarm));
        }
        Ok(self.answered(DriverResponse::FalseAlarmConfirmed, at))
    }

    /// Driver asks for emergency help at `at` (classes D/E only)
    pub fn request_emergency_help(self, at: DateTime<Utc>) -> Result<Self, AlertError> {
        if !self.emergency_available() {
            return Err(self.reject(AlertAction::RequestEmergencyHelp));
        }
        Ok(self.answered(DriverResponse::EmergencyRequested, at))
    }

    /// Close a B/C prompt without answering it
    ///
    /// The alert returns to idle and the next qualifying event raises it again.
    pub fn dismiss(self) -> Result<Self, AlertError> {
        if !self.dismissable() {
            return Err(self.reject(AlertAction::Dismiss));
        }
        Ok(self.cleared())
    }

    /// Silence the severe overlay; the driver prompt stays up
    pub fn acknowledge(self) -> Result<Self, AlertError> {
        if self.phase != AlertPhase::Active {
            return Err(self.reject(AlertAction::Acknowledge));
        }
        Ok(Self {
            phase: AlertPhase::AwaitingDriverResponse,
            ..self
        })
    }

    fn raised(class: SeverityClass, at: DateTime<Utc>) -> Self {
        let phase = if class.is_severe() {
            AlertPhase::Active
        } else {
            AlertPhase::AwaitingDriverResponse
        };
        Self {
            phase,
            active_class: Some(class),
            driver_response: DriverResponse::Unconfirmed,
            raised_at: Some(at),
            responded_at: None,
        }
    }

    /// Back to idle, keeping whatever response was last recorded
    fn cleared(self) -> Self {
        Self {
            phase: AlertPhase::Idle,
            active_class: None,
            raised_at: None,
            ..self
        }
    }

    fn answered(self, response: DriverResponse, at: DateTime<Utc>) -> Self {
        Self {
            driver_response: response,
            responded_at: Some(at),
            ..self.cleared()
        }
    }

    fn reject(&self, action: AlertAction) -> AlertError {
        AlertError::InvalidTransition {
            action,
            phase: self.phase,
            active_class: self.active_class,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classifier::{ClassSource, SeverityIndex};

    fn event(class: SeverityClass) -> ClassifiedEvent {
        ClassifiedEvent::new(
            Utc::now(),
            SeverityIndex::default(),
            class,
            ClassSource::Reported,
        )
    }

    fn feed(classes: &[SeverityClass]) -> AlertState {
        classes
            .iter()
            .fold(AlertState::new(), |state, class| state.observe(&event(*class)).0)
    }

    #[test]
    fn test_idle_ignores_class_a() {
        let (state, transition) = AlertState::new().observe(&event(SeverityClass::A));
        assert_eq!(state, AlertState::new());
        assert_eq!(transition, AlertTransition::Unchanged);
    }

    #[test]
    fn test_minor_event_awaits_driver() {
        let (state, transition) = AlertState::new().observe(&event(SeverityClass::B));
        assert_eq!(state.phase, AlertPhase::AwaitingDriverResponse);
        assert_eq!(state.active_class, Some(SeverityClass::B));
        assert_eq!(state.driver_response, DriverResponse::Unconfirmed);
        assert!(state.confirmation_prompt_visible());
        assert!(!state.severe_overlay_visible());
        assert_eq!(transition, AlertTransition::Raised { class: SeverityClass::B });
    }

    #[test]
    fn test_severe_event_shows_both_surfaces() {
        let state = feed(&[SeverityClass::D]);
        assert_eq!(state.phase, AlertPhase::Active);
        assert!(state.severe_overlay_visible());
        assert!(state.confirmation_prompt_visible());
        assert!(state.raised_at.is_some());
    }

    #[test]
    fn test_escalation_resets_confirmation() {
        let state = feed(&[SeverityClass::C, SeverityClass::B, SeverityClass::D]);
        assert_eq!(state.active_class, Some(SeverityClass::D));
        assert_eq!(state.driver_response, DriverResponse::Unconfirmed);
        assert_eq!(state.phase, AlertPhase::Active);
    }

    #[test]
    fn test_no_deescalation_while_unresolved() {
        let start = feed(&[SeverityClass::D]);
        let (state, transition) = start.observe(&event(SeverityClass::B));
        assert_eq!(state, start);
        assert_eq!(transition, AlertTransition::Unchanged);

        let (state, transition) = start.observe(&event(SeverityClass::D));
        assert_eq!(state, start);
        assert_eq!(transition, AlertTransition::Unchanged);
    }

    #[test]
    fn test_escalation_transition_reports_both_classes() {
        let start = feed(&[SeverityClass::C]);
        let (_, transition) = start.observe(&event(SeverityClass::E));
        assert_eq!(
            transition,
            AlertTransition::Escalated {
                from: SeverityClass::C,
                to: SeverityClass::E
            }
        );
    }

    #[test]
    fn test_normal_reading_resolves() {
        let state = feed(&[SeverityClass::D, SeverityClass::A]);
        assert_eq!(state.phase, AlertPhase::Idle);
        assert_eq!(state.active_class, None);
        assert_eq!(state.raised_at, None);
    }

    #[test]
    fn test_normal_reading_resolves_after_acknowledgement() {
        let state = feed(&[SeverityClass::E]).acknowledge().unwrap();
        let (state, transition) = state.observe(&event(SeverityClass::A));
        assert_eq!(state.phase, AlertPhase::Idle);
        assert_eq!(
            transition,
            AlertTransition::Cleared {
                class: SeverityClass::E,
                cause: ClearCause::BaselineRestored
            }
        );
    }

    #[test]
    fn test_false_alarm_confirmation() {
        let state = feed(&[SeverityClass::C]).confirm_false_alarm(Utc::now()).unwrap();
        assert_eq!(state.phase, AlertPhase::Idle);
        assert_eq!(state.active_class, None);
        assert_eq!(state.driver_response, DriverResponse::FalseAlarmConfirmed);
    }

    #[test]
    fn test_driver_response_is_timestamped() {
        let at = Utc::now();
        let state = feed(&[SeverityClass::D])
            .request_emergency_help(at)
            .unwrap();
        assert_eq!(state.responded_at, Some(at));

        // Survives a baseline reading, reset by the next alert
        let (state, _) = state.observe(&event(SeverityClass::A));
        assert_eq!(state.responded_at, Some(at));
        let (state, _) = state.observe(&event(SeverityClass::B));
        assert_eq!(state.responded_at, None);

        // Dismissal is not an answer
        let state = state.dismiss().unwrap();
        assert_eq!(state.responded_at, None);
    }

    #[test]
    fn test_false_alarm_requires_unresolved_alert() {
        let err = AlertState::new().confirm_false_alarm(Utc::now()).unwrap_err();
        assert_eq!(
            err,
            AlertError::InvalidTransition {
                action: AlertAction::ConfirmFalseAlarm,
                phase: AlertPhase::Idle,
                active_class: None,
            }
        );
    }

    #[test]
    fn test_emergency_gated_on_severity() {
        let moderate = feed(&[SeverityClass::C]);
        assert!(matches!(
            moderate.request_emergency_help(Utc::now()),
            Err(AlertError::InvalidTransition {
                action: AlertAction::RequestEmergencyHelp,
                active_class: Some(SeverityClass::C),
                ..
            })
        ));

        let critical = feed(&[SeverityClass::E]).request_emergency_help(Utc::now()).unwrap();
        assert_eq!(critical.driver_response, DriverResponse::EmergencyRequested);
        assert_eq!(critical.phase, AlertPhase::Idle);
    }

    #[test]
    fn test_emergency_allowed_after_acknowledgement() {
        let state = feed(&[SeverityClass::D]).acknowledge().unwrap();
        let state = state.request_emergency_help(Utc::now()).unwrap();
        assert_eq!(state.driver_response, DriverResponse::EmergencyRequested);
    }

    #[test]
    fn test_dismiss_minor_rearms_on_next_event() {
        let state = feed(&[SeverityClass::B]).dismiss().unwrap();
        assert_eq!(state.phase, AlertPhase::Idle);
        assert_eq!(state.driver_response, DriverResponse::Unconfirmed);

        let (state, transition) = state.observe(&event(SeverityClass::B));
        assert_eq!(state.phase, AlertPhase::AwaitingDriverResponse);
        assert_eq!(transition, AlertTransition::Raised { class: SeverityClass::B });
    }

    #[test]
    fn test_dismiss_rejected_for_severe() {
        for class in [SeverityClass::D, SeverityClass::E] {
            let state = feed(&[class]);
            assert!(state.dismiss().is_err());
            // Still rejected once the overlay is silenced
            assert!(state.acknowledge().unwrap().dismiss().is_err());
        }
        assert!(AlertState::new().dismiss().is_err());
    }

    #[test]
    fn test_acknowledge_silences_overlay_only() {
        let state = feed(&[SeverityClass::D]).acknowledge().unwrap();
        assert_eq!(state.phase, AlertPhase::AwaitingDriverResponse);
        assert_eq!(state.active_class, Some(SeverityClass::D));
        assert!(!state.severe_overlay_visible());
        assert!(state.confirmation_prompt_visible());
        assert_eq!(state.driver_response, DriverResponse::Unconfirmed);
    }

    #[test]
    fn test_acknowledge_requires_active_overlay() {
        assert!(AlertState::new().acknowledge().is_err());
        assert!(feed(&[SeverityClass::C]).acknowledge().is_err());
        let acked = feed(&[SeverityClass::E]).acknowledge().unwrap();
        assert!(acked.acknowledge().is_err());
    }

    #[test]
    fn test_escalation_after_acknowledgement_reopens_overlay() {
        let state = feed(&[SeverityClass::D]).acknowledge().unwrap();
        let (state, _) = state.observe(&event(SeverityClass::E));
        assert_eq!(state.phase, AlertPhase::Active);
        assert_eq!(state.active_class, Some(SeverityClass::E));
    }

    #[test]
    fn test_new_alert_resets_previous_response() {
        let state = feed(&[SeverityClass::E]).request_emergency_help(Utc::now()).unwrap();
        let (state, _) = state.observe(&event(SeverityClass::C));
        assert_eq!(state.driver_response, DriverResponse::Unconfirmed);
    }

    #[test]
    fn test_baseline_keeps_recorded_response() {
        let state = feed(&[SeverityClass::C])
            .confirm_false_alarm(Utc::now())
            .unwrap();
        let (state, transition) = state.observe(&event(SeverityClass::A));
        assert_eq!(state.driver_response, DriverResponse::FalseAlarmConfirmed);
        assert_eq!(transition, AlertTransition::Unchanged);
    }

    #[test]
    fn test_active_class_tracks_phase() {
        let sequences: [&[SeverityClass]; 4] = [
            &[SeverityClass::B, SeverityClass::A],
            &[SeverityClass::C, SeverityClass::E, SeverityClass::B],
            &[SeverityClass::A, SeverityClass::D],
            &[SeverityClass::E, SeverityClass::A, SeverityClass::A],
        ];
        for classes in sequences {
            let state = feed(classes);
            assert_eq!(state.active_class.is_some(), state.phase != AlertPhase::Idle);
        }
    }
}
