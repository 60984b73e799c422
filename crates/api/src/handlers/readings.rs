//! Handlers for sensor reading ingestion and queries.
//!
//! Validation and alert evaluation live in `nordetect_core`; these handlers
//! only bind them to the repository and the HTTP envelope.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use nordetect_core::alert::summarize;
use nordetect_core::error::CoreError;
use nordetect_core::query::ReadingListQuery;
use nordetect_core::reading::{normalize_submission, ReadingSubmission};
use nordetect_core::types::DbId;
use nordetect_db::repositories::ReadingRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Ingestion
// ---------------------------------------------------------------------------

/// POST /api/v1/readings
///
/// Validate and store a reading. Missing `timestamp` defaults to the time
/// the request was handled.
pub async fn create_reading(
    State(state): State<AppState>,
    body: Result<Json<ReadingSubmission>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(submission) = body.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

    let new_reading = normalize_submission(&submission, Utc::now())?;
    let reading = ReadingRepo::insert(&state.pool, &new_reading)
        .await
        .map_err(AppError::persistence("create reading"))?;

    tracing::info!(
        id = reading.id,
        device_id = %reading.device_id,
        "Reading created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: reading })))
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// GET /api/v1/readings
///
/// List readings, newest first. Without `startDate` only the last 24 hours
/// are returned.
pub async fn list_readings(
    State(state): State<AppState>,
    query: Result<Query<ReadingListQuery>, QueryRejection>,
) -> AppResult<impl IntoResponse> {
    let Query(params) = query.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

    let filter = params.resolve(Utc::now())?;
    let readings = ReadingRepo::list(&state.pool, &filter)
        .await
        .map_err(AppError::persistence("list readings"))?;

    tracing::debug!(count = readings.len(), limit = filter.limit, "Listed readings");

    Ok(Json(DataResponse { data: readings }))
}

/// GET /api/v1/readings/latest
pub async fn latest_readings(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let readings = ReadingRepo::latest_per_device(&state.pool)
        .await
        .map_err(AppError::persistence("load latest readings"))?;

    Ok(Json(DataResponse { data: readings }))
}

/// GET /api/v1/readings/stats
pub async fn reading_stats(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let stats = ReadingRepo::stats(&state.pool)
        .await
        .map_err(AppError::persistence("load reading stats"))?;

    Ok(Json(DataResponse { data: stats }))
}

/// GET /api/v1/readings/alerts
///
/// Alert summary over each device's latest reading.
pub async fn reading_alerts(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let latest = ReadingRepo::latest_per_device(&state.pool)
        .await
        .map_err(AppError::persistence("load latest readings"))?;
    let summary = summarize(&latest);

    Ok(Json(DataResponse { data: summary }))
}

/// GET /api/v1/readings/{id}
pub async fn get_reading(
    State(state): State<AppState>,
    path: Result<Path<DbId>, PathRejection>,
) -> AppResult<impl IntoResponse> {
    let Path(id) = path.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

    let reading = ReadingRepo::find_by_id(&state.pool, id)
        .await
        .map_err(AppError::persistence("load reading"))?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Reading",
            id,
        }))?;

    Ok(Json(DataResponse { data: reading }))
}
