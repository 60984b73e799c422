//! Demo data set for local development.
//!
//! Five greenhouse devices with readings spread over the last six hours, so
//! they all fall inside the default 24-hour list window. GH003 breaches the
//! nitrogen limit and GH004 sits above the pH band.

use chrono::Duration;
use nordetect_core::reading::{normalize_submission, ReadingSubmission};
use nordetect_core::types::Timestamp;
use nordetect_db::models::reading::Reading;
use nordetect_db::repositories::ReadingRepo;
use nordetect_db::DbPool;
use serde_json::json;

use crate::error::AppError;

/// One demo reading: `(device_id, minutes_ago, nitrogen, phosphorus, ph)`.
type SeedRow = (&'static str, i64, f64, f64, f64);

pub const SEED_READINGS: &[SeedRow] = &[
    ("GH001", 180, 145.5, 42.1, 6.8),
    ("GH001", 120, 152.3, 44.7, 6.7),
    ("GH001", 60, 148.9, 43.2, 6.9),
    ("GH002", 210, 167.2, 38.5, 6.4),
    ("GH002", 150, 172.8, 41.3, 6.3),
    ("GH002", 90, 169.5, 39.8, 6.5),
    ("GH003", 240, 220.5, 52.3, 5.8),
    ("GH003", 120, 215.8, 48.7, 5.9),
    ("GH004", 300, 134.2, 35.8, 7.2),
    ("GH004", 180, 138.7, 37.1, 7.1),
    ("GH005", 360, 156.3, 46.9, 6.6),
    ("GH005", 240, 159.1, 48.2, 6.5),
];

/// Insert [`SEED_READINGS`] relative to `now`.
///
/// Rows go through the same validation as API submissions. Existing
/// readings are left untouched.
pub async fn seed_demo_readings(pool: &DbPool, now: Timestamp) -> Result<Vec<Reading>, AppError> {
    let mut inserted = Vec::with_capacity(SEED_READINGS.len());

    for &(device_id, minutes_ago, nitrogen, phosphorus, ph) in SEED_READINGS {
        let submission = ReadingSubmission {
            device_id: Some(json!(device_id)),
            timestamp: Some(json!((now - Duration::minutes(minutes_ago)).to_rfc3339())),
            nitrogen: Some(json!(nitrogen)),
            phosphorus: Some(json!(phosphorus)),
            ph: Some(json!(ph)),
        };
        let new_reading = normalize_submission(&submission, now)?;
        let reading = ReadingRepo::insert(pool, &new_reading)
            .await
            .map_err(AppError::persistence("seed reading"))?;
        inserted.push(reading);
    }

    Ok(inserted)
}
