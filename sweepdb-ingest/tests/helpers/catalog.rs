//! Catalog test utilities

use sqlx::SqlitePool;
use std::path::Path;
use sweepdb_common::db::init_catalog;

/// File-backed catalog inside `dir`
pub async fn create_test_catalog(dir: &Path) -> SqlitePool {
    init_catalog(&dir.join("catalog.db")).await.unwrap()
}

pub async fn count_rows(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn column_names(pool: &SqlitePool, table: &str) -> Vec<String> {
    sqlx::query_scalar(&format!("SELECT name FROM pragma_table_info('{}')", table))
        .fetch_all(pool)
        .await
        .unwrap()
}

/// Every row of `table` rendered as text, in rowid order
///
/// Two equal dumps mean no column of any row changed.
pub async fn dump_table(pool: &SqlitePool, table: &str) -> Vec<String> {
    let columns = column_names(pool, table).await;
    let select = columns
        .iter()
        .map(|c| format!("quote({})", c))
        .collect::<Vec<_>>()
        .join(" || '|' || ");
    sqlx::query_scalar(&format!("SELECT {} FROM {} ORDER BY rowid", select, table))
        .fetch_all(pool)
        .await
        .unwrap()
}

/// Dump of all three catalog tables
pub async fn dump_catalog(pool: &SqlitePool) -> Vec<Vec<String>> {
    let mut dump = Vec::new();
    for table in ["file_host", "measurement", "measurement_file"] {
        dump.push(dump_table(pool, table).await);
    }
    dump
}
