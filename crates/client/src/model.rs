//! Wire types returned by the API.

use nordetect_core::reading::{Measurements, SensorReading};
use nordetect_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};

/// `{ "data": T }` response envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct DataEnvelope<T> {
    pub data: T,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingStats {
    pub total_readings: i64,
    pub device_count: i64,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub db_healthy: bool,
    pub uptime_secs: u64,
    pub environment: String,
    pub timestamp: Timestamp,
}

/// Merge a freshly created reading into a latest-per-device list.
///
/// The list stays ordered by device id. An existing entry for the device is
/// replaced only when the new reading is at least as recent and has a
/// higher id, matching the server's tie-break.
pub fn upsert_latest(latest: &mut Vec<Reading>, reading: Reading) {
    match latest.binary_search_by(|r| r.device_id.as_str().cmp(&reading.device_id)) {
        Ok(pos) => {
            let current = &latest[pos];
            if (reading.timestamp, reading.id) > (current.timestamp, current.id) {
                latest[pos] = reading;
            }
        }
        Err(pos) => latest.insert(pos, reading),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    fn reading(id: DbId, device_id: &str, minutes: i64) -> Reading {
        Reading {
            id,
            device_id: device_id.to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap()
                + Duration::minutes(minutes),
            nitrogen: 150.0,
            phosphorus: 45.0,
            ph: 6.5,
        }
    }

    fn devices(latest: &[Reading]) -> Vec<&str> {
        latest.iter().map(|r| r.device_id.as_str()).collect()
    }

    #[test]
    fn new_device_is_inserted_in_order() {
        let mut latest = vec![reading(1, "GH001", 0), reading(2, "GH003", 0)];
        upsert_latest(&mut latest, reading(3, "GH002", 0));
        assert_eq!(devices(&latest), ["GH001", "GH002", "GH003"]);

        upsert_latest(&mut latest, reading(4, "FD001", 0));
        assert_eq!(devices(&latest)[0], "FD001");
    }

    #[test]
    fn newer_reading_replaces_existing() {
        let mut latest = vec![reading(1, "GH001", 0)];
        upsert_latest(&mut latest, reading(2, "GH001", 5));
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].id, 2);
    }

    #[test]
    fn backdated_reading_is_ignored() {
        let mut latest = vec![reading(5, "GH001", 10)];
        upsert_latest(&mut latest, reading(6, "GH001", -60));
        assert_eq!(latest[0].id, 5);
    }

    #[test]
    fn same_timestamp_prefers_higher_id() {
        let mut latest = vec![reading(5, "GH001", 0)];
        upsert_latest(&mut latest, reading(6, "GH001", 0));
        assert_eq!(latest[0].id, 6);
    }
}
