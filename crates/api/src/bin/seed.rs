//! Insert the demo reading set into the configured database.
//!
//! Reads the same environment as the server (`DATABASE_URL`, `LOG_FORMAT`,
//! ...). Never deletes existing rows.

use std::collections::BTreeMap;

use anyhow::Context;
use chrono::Utc;

use nordetect_api::config::ServerConfig;
use nordetect_api::seed::seed_demo_readings;
use nordetect_api::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = ServerConfig::from_env()?;
    telemetry::init_tracing(config.log_format);

    let pool = nordetect_db::create_pool(&config.database_url, config.db_max_connections)
        .await
        .context("Failed to connect to database")?;
    nordetect_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!(database_url = %config.database_url, "Database ready");

    let inserted = seed_demo_readings(&pool, Utc::now())
        .await
        .context("Seeding failed")?;

    let mut per_device: BTreeMap<&str, usize> = BTreeMap::new();
    for reading in &inserted {
        *per_device.entry(reading.device_id.as_str()).or_default() += 1;
    }
    for (device_id, count) in &per_device {
        tracing::info!(device_id, count, "Seeded device");
    }
    tracing::info!(total = inserted.len(), "Seeding complete");

    pool.close().await;
    Ok(())
}
