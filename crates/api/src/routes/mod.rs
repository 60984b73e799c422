pub mod health;
pub mod readings;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /readings                 list (GET), submit (POST)
/// /readings/latest          latest reading per device
/// /readings/stats           total readings and distinct devices
/// /readings/alerts          alert summary over the latest readings
/// /readings/{id}            single reading
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/readings", readings::router())
}
