//! Catalog database creation and schema synchronization

use sweepdb_common::db::{
    init_catalog, init_in_memory_catalog, introspect_table, sync_catalog_schema, table_exists,
};
use tempfile::TempDir;

#[tokio::test]
async fn test_catalog_created_when_missing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("nested").join("catalog.db");
    assert!(!db_path.exists());

    let pool = init_catalog(&db_path).await.unwrap();
    assert!(db_path.exists());

    let mut conn = pool.acquire().await.unwrap();
    for table in ["file_host", "measurement", "measurement_file"] {
        assert!(table_exists(&mut conn, table).await.unwrap(), "missing table {}", table);
    }
}

#[tokio::test]
async fn test_reopen_existing_catalog_keeps_rows() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("catalog.db");

    let pool = init_catalog(&db_path).await.unwrap();
    sqlx::query("INSERT INTO file_host (host_name, base_url) VALUES ('a', 'http://a')")
        .execute(&pool)
        .await
        .unwrap();
    pool.close().await;

    let pool = init_catalog(&db_path).await.unwrap();
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM file_host")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_host_uniqueness_enforced_by_database() {
    let pool = init_in_memory_catalog().await.unwrap();
    let insert = "INSERT INTO file_host (host_name, base_url) VALUES ('a', 'http://a')";

    sqlx::query(insert).execute(&pool).await.unwrap();
    assert!(sqlx::query(insert).execute(&pool).await.is_err());
}

#[tokio::test]
async fn test_file_rows_require_known_host() {
    let pool = init_in_memory_catalog().await.unwrap();
    let result = sqlx::query(
        "INSERT INTO measurement_file (kind, host_id, relative_path, file_size_bytes, checksum_sha256) \
         VALUES ('mdat', 42, 'mdat/x.mdat', 1, 'ab')",
    )
    .execute(&pool)
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_schema_sync_adds_statistics_columns_once() {
    let pool = init_in_memory_catalog().await.unwrap();
    let mut conn = pool.acquire().await.unwrap();
    let before = introspect_table(&mut conn, "measurement").await.unwrap().len();

    sync_catalog_schema(&mut conn).await.unwrap();
    let after = introspect_table(&mut conn, "measurement").await.unwrap();
    assert_eq!(after.len(), before + 6);
    assert!(after.iter().any(|c| c.name == "spl_count"));

    sync_catalog_schema(&mut conn).await.unwrap();
    assert_eq!(introspect_table(&mut conn, "measurement").await.unwrap().len(), after.len());
}

#[tokio::test]
async fn test_schema_sync_rolls_back_with_transaction() {
    let pool = init_in_memory_catalog().await.unwrap();
    let mut tx = pool.begin().await.unwrap();
    let before = introspect_table(&mut tx, "measurement").await.unwrap().len();

    sync_catalog_schema(&mut tx).await.unwrap();
    assert_eq!(introspect_table(&mut tx, "measurement").await.unwrap().len(), before + 6);
    tx.rollback().await.unwrap();

    let mut conn = pool.acquire().await.unwrap();
    assert_eq!(introspect_table(&mut conn, "measurement").await.unwrap().len(), before);
}
