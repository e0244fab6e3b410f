//! API Error Types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use monitor::MonitorError;
use serde::Serialize;
use thiserror::Error;

use crate::SourceKind;

/// Errors returned by handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Monitor(#[from] MonitorError),

    /// Device push while another source owns the session
    #[error("Device push disabled: reading source is {0:?}")]
    PushDisabled(SourceKind),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Monitor(MonitorError::MalformedReading(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Monitor(MonitorError::InvalidTransition(_)) => StatusCode::CONFLICT,
            ApiError::PushDisabled(_) => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
