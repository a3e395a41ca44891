//! Provenance host registry

use crate::error::IngestResult;
use crate::models::Host;
use sqlx::{Row, SqliteConnection};

/// Look up a host, creating it on first reference
///
/// Existing rows are never modified.
pub async fn ensure_host(conn: &mut SqliteConnection, host_name: &str, base_url: &str) -> IngestResult<Host> {
    sqlx::query(
        r#"
        INSERT INTO file_host (host_name, base_url)
        VALUES (?, ?)
        ON CONFLICT(host_name, base_url) DO NOTHING
        "#,
    )
    .bind(host_name)
    .bind(base_url)
    .execute(&mut *conn)
    .await?;

    let row = sqlx::query("SELECT id, host_name, base_url FROM file_host WHERE host_name = ? AND base_url = ?")
        .bind(host_name)
        .bind(base_url)
        .fetch_one(&mut *conn)
        .await?;

    let host = Host {
        id: row.try_get("id")?,
        host_name: row.try_get("host_name")?,
        base_url: row.try_get("base_url")?,
    };

    tracing::debug!(host_id = host.id, host_name, base_url, "Host resolved");
    Ok(host)
}

/// Host by `(host_name, base_url)`, without creating it
pub async fn find_host(conn: &mut SqliteConnection, host_name: &str, base_url: &str) -> IngestResult<Option<Host>> {
    let row = sqlx::query("SELECT id, host_name, base_url FROM file_host WHERE host_name = ? AND base_url = ?")
        .bind(host_name)
        .bind(base_url)
        .fetch_optional(&mut *conn)
        .await?;

    row.map(|row| {
        Ok(Host {
            id: row.try_get("id")?,
            host_name: row.try_get("host_name")?,
            base_url: row.try_get("base_url")?,
        })
    })
    .transpose()
}
