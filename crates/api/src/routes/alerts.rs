//! Alert Routes

use alerting::AlertState;
use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::{ApiError, AppState};

/// Alert state plus which dashboard surfaces it drives
#[derive(Debug, Serialize)]
pub struct AlertView {
    #[serde(flatten)]
    pub state: AlertState,
    pub severe_overlay: bool,
    pub confirmation_prompt: bool,
    pub emergency_available: bool,
    pub dismissable: bool,
}

impl From<AlertState> for AlertView {
    fn from(state: AlertState) -> Self {
        Self {
            severe_overlay: state.severe_overlay_visible(),
            confirmation_prompt: state.confirmation_prompt_visible(),
            emergency_available: state.emergency_available(),
            dismissable: state.dismissable(),
            state,
        }
    }
}

/// Get the current alert
pub async fn get_alert(State(state): State<Arc<AppState>>) -> Json<AlertView> {
    Json(state.monitor.alert_state().into())
}

/// Driver reports a false alarm
pub async fn confirm_false_alarm(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AlertView>, ApiError> {
    Ok(Json(state.monitor.confirm_false_alarm()?.into()))
}

/// Driver requests emergency help
pub async fn request_emergency_help(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AlertView>, ApiError> {
    Ok(Json(state.monitor.request_emergency_help()?.into()))
}

/// Close a minor/moderate prompt
pub async fn dismiss(State(state): State<Arc<AppState>>) -> Result<Json<AlertView>, ApiError> {
    Ok(Json(state.monitor.dismiss_alert()?.into()))
}

/// Silence the severe overlay
pub async fn acknowledge(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AlertView>, ApiError> {
    Ok(Json(state.monitor.acknowledge_alert()?.into()))
}
