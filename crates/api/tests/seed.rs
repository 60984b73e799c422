//! Tests for the demo data seeder.

mod common;

use chrono::Utc;
use common::{body_json, build_test_app, get};
use nordetect_api::seed::{seed_demo_readings, SEED_READINGS};
use sqlx::SqlitePool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_seed_inserts_every_row_inside_default_window(pool: SqlitePool) {
    let inserted = seed_demo_readings(&pool, Utc::now()).await.unwrap();
    assert_eq!(inserted.len(), SEED_READINGS.len());

    let json = body_json(get(build_test_app(pool.clone()), "/api/v1/readings").await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), SEED_READINGS.len());

    let stats = body_json(get(build_test_app(pool), "/api/v1/readings/stats").await).await;
    assert_eq!(stats["data"]["deviceCount"], 5);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_seed_data_raises_expected_alerts(pool: SqlitePool) {
    seed_demo_readings(&pool, Utc::now()).await.unwrap();

    let json = body_json(get(build_test_app(pool), "/api/v1/readings/alerts").await).await;
    let data = &json["data"];
    assert_eq!(data["errors"][0]["deviceId"], "GH003");
    assert_eq!(data["errors"].as_array().unwrap().len(), 1);
    assert_eq!(data["warnings"][0]["deviceId"], "GH004");
    assert_eq!(data["warnings"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_seed_is_additive(pool: SqlitePool) {
    let now = Utc::now();
    seed_demo_readings(&pool, now).await.unwrap();
    seed_demo_readings(&pool, now).await.unwrap();

    let count = nordetect_db::repositories::ReadingRepo::count_total(&pool)
        .await
        .unwrap();
    assert_eq!(count as usize, SEED_READINGS.len() * 2);
}
