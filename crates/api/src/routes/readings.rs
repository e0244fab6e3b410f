//! Device Push Route

use axum::{extract::State, Json};
use chrono::Utc;
use ingestion::DevicePayload;
use monitor::MonitorUpdate;
use std::sync::Arc;
use tracing::debug;

use crate::{ApiError, AppState, SourceKind};

/// Accept one device sample
///
/// Only served when the device is the configured source; the synthetic
/// subscription is the single producer otherwise.
pub async fn push_reading(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<DevicePayload>,
) -> Result<Json<MonitorUpdate>, ApiError> {
    if state.source != SourceKind::Push {
        return Err(ApiError::PushDisabled(state.source));
    }

    debug!("Device payload received: {:?}", payload);
    let reading = payload
        .into_reading(Utc::now())
        .map_err(|e| state.monitor.reject(e))?;
    Ok(Json(state.monitor.ingest(reading)?))
}
