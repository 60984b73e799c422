//! Repository for the `readings` table (append-only).

use nordetect_core::query::ReadingFilter;
use nordetect_core::reading::NewReading;
use nordetect_core::types::DbId;
use sqlx::SqlitePool;

use crate::models::reading::{Reading, ReadingStats};

/// Column list for `readings` SELECT queries.
const COLUMNS: &str = "id, device_id, timestamp, nitrogen, phosphorus, ph";

/// Column list for `readings` INSERT statements (excludes the generated `id`).
const INSERT_COLUMNS: &str = "device_id, timestamp, nitrogen, phosphorus, ph";

/// Provides query operations for sensor readings.
pub struct ReadingRepo;

impl ReadingRepo {
    /// Insert a validated reading, returning the stored row with its new id.
    pub async fn insert(pool: &SqlitePool, input: &NewReading) -> Result<Reading, sqlx::Error> {
        let query = format!(
            "INSERT INTO readings ({INSERT_COLUMNS}) \
             VALUES (?1, ?2, ?3, ?4, ?5) \
             RETURNING {COLUMNS}"
        );
        let reading = sqlx::query_as::<_, Reading>(&query)
            .bind(&input.device_id)
            .bind(input.timestamp)
            .bind(input.nitrogen)
            .bind(input.phosphorus)
            .bind(input.ph)
            .fetch_one(pool)
            .await?;

        tracing::debug!(id = reading.id, device_id = %reading.device_id, "Reading stored");
        Ok(reading)
    }

    /// Find a reading by its id.
    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> Result<Option<Reading>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM readings WHERE id = ?1");
        sqlx::query_as::<_, Reading>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List readings matching a resolved filter, most recent first.
    ///
    /// Both time bounds are inclusive. Rows sharing a timestamp are ordered
    /// by descending id so pagination by `limit` is stable.
    pub async fn list(
        pool: &SqlitePool,
        filter: &ReadingFilter,
    ) -> Result<Vec<Reading>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM readings \
             WHERE (?1 IS NULL OR device_id = ?1) \
               AND timestamp >= ?2 \
               AND (?3 IS NULL OR timestamp <= ?3) \
             ORDER BY timestamp DESC, id DESC \
             LIMIT ?4"
        );
        sqlx::query_as::<_, Reading>(&query)
            .bind(filter.device_id.as_deref())
            .bind(filter.since)
            .bind(filter.until)
            .bind(filter.limit)
            .fetch_all(pool)
            .await
    }

    /// Get the most recent reading for every device, ordered by device id.
    ///
    /// When a device has several readings at its latest timestamp, the one
    /// with the highest id wins.
    pub async fn latest_per_device(pool: &SqlitePool) -> Result<Vec<Reading>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM ( \
                SELECT {COLUMNS}, \
                       ROW_NUMBER() OVER ( \
                           PARTITION BY device_id \
                           ORDER BY timestamp DESC, id DESC \
                       ) AS row_rank \
                FROM readings \
             ) \
             WHERE row_rank = 1 \
             ORDER BY device_id ASC"
        );
        sqlx::query_as::<_, Reading>(&query).fetch_all(pool).await
    }

    /// Count all readings.
    pub async fn count_total(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM readings")
            .fetch_one(pool)
            .await
    }

    /// Count distinct device ids across all readings.
    pub async fn count_devices(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(DISTINCT device_id) FROM readings")
            .fetch_one(pool)
            .await
    }

    /// Both counts, read in a single statement so they describe the same
    /// snapshot.
    pub async fn stats(pool: &SqlitePool) -> Result<ReadingStats, sqlx::Error> {
        sqlx::query_as::<_, ReadingStats>(
            "SELECT COUNT(*) AS total_readings, \
                    COUNT(DISTINCT device_id) AS device_count \
             FROM readings",
        )
        .fetch_one(pool)
        .await
    }
}
