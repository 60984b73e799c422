//! Sensor reading row model and aggregate views.

use nordetect_core::reading::{Measurements, SensorReading};
use nordetect_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A stored sensor reading. Rows are never updated or deleted.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    pub id: DbId,
    pub device_id: String,
    pub timestamp: Timestamp,
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub ph: f64,
}

impl SensorReading for Reading {
    fn id(&self) -> DbId {
        self.id
    }

    fn device_id(&self) -> &str {
        &self.device_id
    }

    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    fn measurements(&self) -> Measurements {
        Measurements {
            nitrogen: self.nitrogen,
            phosphorus: self.phosphorus,
            ph: self.ph,
        }
    }
}

/// Collection-wide counts served by the stats endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingStats {
    pub total_readings: i64,
    pub device_count: i64,
}
