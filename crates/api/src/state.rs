use std::sync::Arc;
use std::time::Instant;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the pool is reference counted and the config sits
/// behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: nordetect_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// When the process started serving, for the health endpoint's uptime.
    pub started_at: Instant,
}

impl AppState {
    pub fn new(pool: nordetect_db::DbPool, config: ServerConfig) -> Self {
        Self {
            pool,
            config: Arc::new(config),
            started_at: Instant::now(),
        }
    }
}
