#![allow(dead_code)]

use std::path::PathBuf;

use chrono::{DateTime, TimeZone, Utc};
use sea_orm::Database;

use engine::Engine;
use migration::MigratorTrait;

/// In-memory engine with one registered owner. Exports land in
/// `target/test_exports/<name>`.
pub async fn engine_with_owner(name: &str) -> (Engine, i64) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db)
        .export_dir(export_dir(name))
        .build()
        .await
        .unwrap();
    let user = engine
        .register_user("alice", "alice@example.com", "password")
        .await
        .unwrap();
    (engine, user.id)
}

pub fn export_dir(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../target/test_exports")
        .join(name)
}

pub fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}
