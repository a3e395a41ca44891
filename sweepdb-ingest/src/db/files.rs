//! File rows, unique by `(host_id, relative_path)`
//!
//! Rows are mutated in place when size or checksum change and are never
//! deleted here. `kind` and `created_at` keep their first-seen values.

use crate::error::{IngestError, IngestResult};
use crate::models::{FileKind, MeasurementFile};
use crate::services::checksum::FileDigest;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use uuid::Uuid;

const FILE_COLUMNS: &str =
    "id, measurement_id, kind, host_id, relative_path, file_size_bytes, checksum_sha256";

fn size_column(digest: &FileDigest) -> i64 {
    i64::try_from(digest.size_bytes).unwrap_or(i64::MAX)
}

fn file_from_row(row: &SqliteRow) -> IngestResult<MeasurementFile> {
    let measurement_id: Option<String> = row.try_get("measurement_id")?;
    let measurement_id = measurement_id
        .map(|id| {
            Uuid::parse_str(&id)
                .map_err(|e| IngestError::Internal(format!("invalid measurement id {:?} in catalog: {}", id, e)))
        })
        .transpose()?;
    let kind: String = row.try_get("kind")?;

    Ok(MeasurementFile {
        id: row.try_get("id")?,
        measurement_id,
        kind: FileKind::parse(&kind)?,
        host_id: row.try_get("host_id")?,
        relative_path: row.try_get("relative_path")?,
        file_size_bytes: row.try_get("file_size_bytes")?,
        checksum_sha256: row.try_get("checksum_sha256")?,
    })
}

/// File row for `(host_id, relative_path)`, if cataloged
pub async fn find_file(
    conn: &mut SqliteConnection,
    host_id: i64,
    relative_path: &str,
) -> IngestResult<Option<MeasurementFile>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM measurement_file WHERE host_id = ? AND relative_path = ?",
        FILE_COLUMNS
    ))
    .bind(host_id)
    .bind(relative_path)
    .fetch_optional(&mut *conn)
    .await?;

    row.as_ref().map(file_from_row).transpose()
}

/// Insert or refresh a container file; never linked to a measurement
///
/// Returns the row id.
pub async fn upsert_container_file(
    conn: &mut SqliteConnection,
    host_id: i64,
    relative_path: &str,
    digest: &FileDigest,
) -> IngestResult<i64> {
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO measurement_file (measurement_id, kind, host_id, relative_path, file_size_bytes, checksum_sha256)
        VALUES (NULL, ?, ?, ?, ?, ?)
        ON CONFLICT(host_id, relative_path) DO UPDATE SET
            file_size_bytes = excluded.file_size_bytes,
            checksum_sha256 = excluded.checksum_sha256
        RETURNING id
        "#,
    )
    .bind(FileKind::Mdat.as_str())
    .bind(host_id)
    .bind(relative_path)
    .bind(size_column(digest))
    .bind(&digest.checksum_sha256)
    .fetch_one(&mut *conn)
    .await?;

    Ok(id)
}

/// Insert or refresh an exported-result file and link it to its measurement
///
/// Returns the row id.
pub async fn upsert_export_file(
    conn: &mut SqliteConnection,
    host_id: i64,
    relative_path: &str,
    digest: &FileDigest,
    measurement_id: Uuid,
) -> IngestResult<i64> {
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO measurement_file (measurement_id, kind, host_id, relative_path, file_size_bytes, checksum_sha256)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(host_id, relative_path) DO UPDATE SET
            measurement_id = excluded.measurement_id,
            file_size_bytes = excluded.file_size_bytes,
            checksum_sha256 = excluded.checksum_sha256
        RETURNING id
        "#,
    )
    .bind(measurement_id.to_string())
    .bind(FileKind::Json.as_str())
    .bind(host_id)
    .bind(relative_path)
    .bind(size_column(digest))
    .bind(&digest.checksum_sha256)
    .fetch_one(&mut *conn)
    .await?;

    Ok(id)
}

/// All files of a host, ordered by relative path
pub async fn load_files_for_host(conn: &mut SqliteConnection, host_id: i64) -> IngestResult<Vec<MeasurementFile>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM measurement_file WHERE host_id = ? ORDER BY relative_path",
        FILE_COLUMNS
    ))
    .bind(host_id)
    .fetch_all(&mut *conn)
    .await?;

    rows.iter().map(file_from_row).collect()
}

pub async fn count_files(conn: &mut SqliteConnection) -> IngestResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM measurement_file")
        .fetch_one(&mut *conn)
        .await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::hosts::ensure_host;
    use crate::db::measurements::upsert_measurement;
    use crate::models::Measurement;
    use sweepdb_common::db::{init_in_memory_catalog, sync_catalog_schema};

    fn digest(content: &[u8]) -> FileDigest {
        FileDigest::of_bytes(content)
    }

    #[tokio::test]
    async fn test_container_upsert_updates_in_place() {
        let pool = init_in_memory_catalog().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        let host = ensure_host(&mut conn, "bench", "http://bench.local").await.unwrap();

        assert!(find_file(&mut conn, host.id, "mdat/a.mdat").await.unwrap().is_none());

        let first = upsert_container_file(&mut conn, host.id, "mdat/a.mdat", &digest(b"v1")).await.unwrap();
        let second = upsert_container_file(&mut conn, host.id, "mdat/a.mdat", &digest(b"version 2")).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(count_files(&mut conn).await.unwrap(), 1);

        let file = find_file(&mut conn, host.id, "mdat/a.mdat").await.unwrap().unwrap();
        assert_eq!(file.kind, FileKind::Mdat);
        assert_eq!(file.measurement_id, None);
        assert_eq!(file.file_size_bytes, 9);
        assert_eq!(file.checksum_sha256, digest(b"version 2").checksum_sha256);
    }

    #[tokio::test]
    async fn test_export_upsert_links_measurement() {
        let pool = init_in_memory_catalog().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        sync_catalog_schema(&mut conn).await.unwrap();
        let host = ensure_host(&mut conn, "bench", "http://bench.local").await.unwrap();

        let a = Measurement::new(Uuid::new_v4(), "Exciter 1");
        let b = Measurement::new(Uuid::new_v4(), "Exciter 2");
        upsert_measurement(&mut conn, &a).await.unwrap();
        upsert_measurement(&mut conn, &b).await.unwrap();

        upsert_export_file(&mut conn, host.id, "json/e.json", &digest(b"{}"), a.id).await.unwrap();
        upsert_export_file(&mut conn, host.id, "json/e.json", &digest(b"{}"), b.id).await.unwrap();
        upsert_container_file(&mut conn, host.id, "mdat/e.mdat", &digest(b"bin")).await.unwrap();

        let files = load_files_for_host(&mut conn, host.id).await.unwrap();
        let paths: Vec<&str> = files.iter().map(|f| f.relative_path.as_str()).collect();
        assert_eq!(paths, vec!["json/e.json", "mdat/e.mdat"]);
        assert_eq!(files[0].measurement_id, Some(b.id));
        assert_eq!(files[0].kind, FileKind::Json);
    }

    #[tokio::test]
    async fn test_same_path_on_two_hosts() {
        let pool = init_in_memory_catalog().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        let h1 = ensure_host(&mut conn, "one", "http://one.local").await.unwrap();
        let h2 = ensure_host(&mut conn, "two", "http://two.local").await.unwrap();

        upsert_container_file(&mut conn, h1.id, "mdat/x.mdat", &digest(b"x")).await.unwrap();
        upsert_container_file(&mut conn, h2.id, "mdat/x.mdat", &digest(b"x")).await.unwrap();
        assert_eq!(count_files(&mut conn).await.unwrap(), 2);
    }
}
