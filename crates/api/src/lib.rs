//! Impact Dashboard API Server
//!
//! REST API over a single impact monitoring session: current reading, event
//! log, alert state and driver actions.

use axum::{extract::State, response::IntoResponse, routing::get, routing::post, Json, Router};
use chrono::{DateTime, Utc};
use ingestion::{spawn_mock_source, Ingestion};
use monitor::{ImpactMonitor, SessionStats};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use uuid::Uuid;

pub mod config;
mod error;
mod notifier;
mod routes;

pub use config::{AppConfig, LoggingConfig, MetricsConfig, SourceKind};
pub use error::ApiError;
pub use notifier::spawn_notifier;

/// Application state shared across handlers
pub struct AppState {
    pub monitor: Arc<ImpactMonitor>,
    pub ingestion: Arc<Ingestion<ImpactMonitor>>,
    /// Configured reading source
    pub source: SourceKind,
    pub version: String,
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(monitor: Arc<ImpactMonitor>, source: SourceKind) -> Self {
        Self {
            ingestion: Arc::new(Ingestion::new(Arc::clone(&monitor))),
            monitor,
            source,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        }
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub session_id: Uuid,
    pub session_started_at: DateTime<Utc>,
    pub source: SourceKind,
    /// Name of the live subscription, if one is running
    pub subscription: Option<String>,
    pub stats: SessionStats,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/events/current", get(routes::events::get_current))
        .route("/api/v1/events/log", get(routes::events::get_log))
        .route("/api/v1/classes", get(routes::events::get_classes))
        .route("/api/v1/alert", get(routes::alerts::get_alert))
        .route(
            "/api/v1/alert/false-alarm",
            post(routes::alerts::confirm_false_alarm),
        )
        .route(
            "/api/v1/alert/emergency",
            post(routes::alerts::request_emergency_help),
        )
        .route("/api/v1/alert/dismiss", post(routes::alerts::dismiss))
        .route(
            "/api/v1/alert/acknowledge",
            post(routes::alerts::acknowledge),
        )
        .route("/api/v1/readings", post(routes::readings::push_reading))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        session_id: state.monitor.session_id(),
        session_started_at: state.monitor.started_at(),
        source: state.source,
        subscription: state.ingestion.active_source().await,
        stats: state.monitor.stats(),
    })
}

/// Initialize logging
pub fn init_logging(config: &LoggingConfig) {
    let level = config.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    let result = if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };

    if let Err(e) = result {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Install the Prometheus exporter when a listen address is configured
pub fn init_metrics(
    config: &MetricsConfig,
) -> Result<(), metrics_exporter_prometheus::BuildError> {
    if let Some(addr) = config.listen {
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()?;
        info!("Prometheus exporter listening on {}", addr);
    }
    Ok(())
}

/// Run the service until Ctrl-C
pub async fn run_server(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let monitor = Arc::new(ImpactMonitor::new(config.monitor.clone()));
    let state = Arc::new(AppState::new(Arc::clone(&monitor), config.ingestion.source));

    if config.ingestion.source == SourceKind::Mock {
        let readings = spawn_mock_source(config.ingestion.mock.clone());
        state.ingestion.subscribe("mock", readings).await;
    } else {
        info!("Waiting for device readings on POST /api/v1/readings");
    }

    let notifier = spawn_notifier(monitor.subscribe_updates());
    let ingestion = Arc::clone(&state.ingestion);
    let app = create_router(state);

    info!("Starting API server on {}", config.server.addr);

    let listener = tokio::net::TcpListener::bind(&config.server.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Last alert and log stand; nothing is applied after this point
    ingestion.teardown().await;
    notifier.abort();
    info!("Session {} closed: {:?}", monitor.session_id(), monitor.stats());

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
