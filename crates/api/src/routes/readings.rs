//! Route definitions for sensor readings.

use axum::routing::get;
use axum::Router;

use crate::handlers::readings;
use crate::state::AppState;

/// Reading routes mounted at `/readings`.
///
/// ```text
/// GET    /            -> list_readings
/// POST   /            -> create_reading
/// GET    /latest      -> latest_readings
/// GET    /stats       -> reading_stats
/// GET    /alerts      -> reading_alerts
/// GET    /{id}        -> get_reading
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(readings::list_readings).post(readings::create_reading),
        )
        .route("/latest", get(readings::latest_readings))
        .route("/stats", get(readings::reading_stats))
        .route("/alerts", get(readings::reading_alerts))
        .route("/{id}", get(readings::get_reading))
}
