use axum::extract::State;
use axum::{routing::get, Json, Router};
use chrono::Utc;
use nordetect_core::types::Timestamp;
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the database does not answer.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    pub db_healthy: bool,
    /// Seconds since the server started.
    pub uptime_secs: u64,
    pub environment: String,
    pub timestamp: Timestamp,
}

/// Root banner payload.
#[derive(Serialize)]
pub struct ServiceInfo {
    pub message: &'static str,
    pub timestamp: Timestamp,
    /// Seconds since the server started, with sub-second precision.
    pub uptime: f64,
}

/// GET / -- liveness banner. Does not touch the database.
async fn service_info(State(state): State<AppState>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "Nordetect Sensor API is running",
        timestamp: Utc::now(),
        uptime: state.started_at.elapsed().as_secs_f64(),
    })
}

/// GET /health -- returns service and database health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = match nordetect_db::health_check(&state.pool).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            false
        }
    };

    let status = if db_healthy { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        uptime_secs: state.started_at.elapsed().as_secs(),
        environment: state.config.environment.clone(),
        timestamp: Utc::now(),
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(service_info))
        .route("/health", get(health_check))
}
