//! Reading and Event Log Routes

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use classifier::{ClassifiedEvent, LogStatus, SeverityClass};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::AppState;

/// Most recent classified reading
#[derive(Debug, Serialize)]
pub struct CurrentResponse {
    pub event: Option<ClassifiedEvent>,
    /// Index clamped for the gauge
    pub display_index: Option<f64>,
}

/// Get the current reading
pub async fn get_current(State(state): State<Arc<AppState>>) -> Json<CurrentResponse> {
    let event = state.monitor.current_event();
    Json(CurrentResponse {
        display_index: event.as_ref().map(|e| e.severity_index.display_value()),
        event,
    })
}

/// Query parameters for the log endpoint
#[derive(Debug, Deserialize)]
pub struct LogQuery {
    /// Maximum number of records
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Only entries at or after this time
    pub since: Option<DateTime<Utc>>,
}

fn default_limit() -> usize {
    50
}

/// Response for the log endpoint
#[derive(Debug, Serialize)]
pub struct LogResponse {
    /// Newest first
    pub data: Vec<ClassifiedEvent>,
    pub count: usize,
    pub critical_count: usize,
}

/// Get logged events
pub async fn get_log(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LogQuery>,
) -> Json<LogResponse> {
    let data = state.monitor.log_query(params.limit, params.since);
    let critical_count = data
        .iter()
        .filter(|e| e.log_status == LogStatus::Critical)
        .count();

    Json(LogResponse {
        count: data.len(),
        critical_count,
        data,
    })
}

/// One row of the classification guide
#[derive(Debug, Serialize)]
pub struct ClassInfo {
    pub class: SeverityClass,
    pub name: &'static str,
    pub description: &'static str,
    pub index_range: &'static str,
    pub log_status: LogStatus,
    pub alerting: bool,
    pub severe: bool,
}

/// Classification guide
pub async fn get_classes() -> Json<Vec<ClassInfo>> {
    Json(
        SeverityClass::ALL
            .iter()
            .map(|&class| ClassInfo {
                class,
                name: class.name(),
                description: class.description(),
                index_range: class.index_range(),
                log_status: class.into(),
                alerting: class.is_alerting(),
                severe: class.is_severe(),
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use crate::test_support::{call, test_state};
    use axum::http::StatusCode;
    use chrono::{Duration, TimeZone, Utc};
    use classifier::Reading;
    use serde_json::Value;

    #[tokio::test]
    async fn test_current_is_empty_before_first_reading() {
        let state = test_state();
        let (status, body) = call(&state, "GET", "/api/v1/events/current", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["event"], Value::Null);
        assert_eq!(body["display_index"], Value::Null);
    }

    #[tokio::test]
    async fn test_current_reports_clamped_index() {
        let state = test_state();
        // SFI 12.0, above the gauge ceiling
        state
            .monitor
            .ingest(Reading::new(30.0, 0.0, 1008.0, 0.0, Utc::now()))
            .unwrap();

        let (_, body) = call(&state, "GET", "/api/v1/events/current", None).await;
        assert_eq!(body["event"]["severity_class"], "E");
        assert_eq!(body["event"]["log_status"], "Critical");
        assert_eq!(body["display_index"], 10.0);
        assert!(body["event"]["severity_index"].as_f64().unwrap() > 10.0);
    }

    #[tokio::test]
    async fn test_log_is_newest_first_and_limited() {
        let state = test_state();
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        for i in 0..5 {
            // Class B by index
            state
                .monitor
                .ingest(Reading::new(
                    2.5,
                    0.0,
                    1008.0,
                    0.0,
                    start + Duration::seconds(i),
                ))
                .unwrap();
        }
        // Class A never reaches the log
        state
            .monitor
            .ingest(Reading::new(0.6, 12.0, 1009.0, 350.0, start + Duration::seconds(9)))
            .unwrap();

        let (_, body) = call(&state, "GET", "/api/v1/events/log", None).await;
        assert_eq!(body["count"], 5);
        assert_eq!(body["critical_count"], 0);
        assert_eq!(body["data"][0]["timestamp"], "2024-05-01T10:00:04Z");

        let (_, body) = call(&state, "GET", "/api/v1/events/log?limit=2", None).await;
        assert_eq!(body["count"], 2);

        let (_, body) = call(
            &state,
            "GET",
            "/api/v1/events/log?since=2024-05-01T10:00:03Z",
            None,
        )
        .await;
        assert_eq!(body["count"], 2);
        assert_eq!(body["data"][1]["timestamp"], "2024-05-01T10:00:03Z");
    }

    #[tokio::test]
    async fn test_bad_query_is_rejected() {
        let state = test_state();
        let (status, _) = call(&state, "GET", "/api/v1/events/log?limit=lots", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_classification_guide() {
        let state = test_state();
        let (status, body) = call(&state, "GET", "/api/v1/classes", None).await;

        assert_eq!(status, StatusCode::OK);
        let classes = body.as_array().unwrap();
        assert_eq!(classes.len(), 5);
        assert_eq!(classes[0]["class"], "A");
        assert_eq!(classes[0]["alerting"], false);
        assert_eq!(classes[2]["log_status"], "Alert");
        assert_eq!(classes[3]["severe"], true);
        assert_eq!(classes[4]["index_range"], "SFI >= 5.0");
    }
}
