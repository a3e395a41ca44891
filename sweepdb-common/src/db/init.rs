//! Catalog database initialization
//!
//! Opens (or creates) the SQLite catalog and creates the three catalog
//! tables if they are missing. Uniqueness lives in the database:
//! - `file_host (host_name, base_url)`
//! - `measurement (id)`
//! - `measurement_file (host_id, relative_path)`
//!
//! Writers rely on these constraints with `ON CONFLICT` clauses, so two
//! concurrent sync runs converge instead of duplicating rows.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{SqliteConnection, SqlitePool};
use std::path::Path;
use std::time::Duration;
use tracing::info;

const BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Open the catalog at `db_path`, creating file and tables as needed
pub async fn init_catalog(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new catalog: {}", db_path.display());
    } else {
        info!("Opened existing catalog: {}", db_path.display());
    }

    create_catalog_tables(&mut *pool.acquire().await?).await?;
    Ok(pool)
}

/// Single-connection in-memory catalog (tests, dry runs)
///
/// One connection only: every connection to `:memory:` is its own database.
pub async fn init_in_memory_catalog() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .in_memory(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    create_catalog_tables(&mut *pool.acquire().await?).await?;
    Ok(pool)
}

/// Create the catalog tables (idempotent)
pub async fn create_catalog_tables(conn: &mut SqliteConnection) -> Result<()> {
    create_file_host_table(conn).await?;
    create_measurement_table(conn).await?;
    create_measurement_file_table(conn).await?;
    Ok(())
}

pub async fn create_file_host_table(conn: &mut SqliteConnection) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS file_host (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            host_name TEXT NOT NULL,
            base_url TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE (host_name, base_url)
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Summary-statistics columns are added by schema sync, not here
pub async fn create_measurement_table(conn: &mut SqliteConnection) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS measurement (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            unit_type TEXT,
            unit_number INTEGER,
            smoothing TEXT,
            start_freq REAL,
            end_freq REAL,
            ppo REAL,
            freq_step REAL,
            rew_version TEXT,
            notes TEXT,
            measured_at TIMESTAMP,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn create_measurement_file_table(conn: &mut SqliteConnection) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS measurement_file (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            measurement_id TEXT REFERENCES measurement(id),
            kind TEXT NOT NULL CHECK (kind IN ('mdat', 'json')),
            host_id INTEGER NOT NULL REFERENCES file_host(id),
            relative_path TEXT NOT NULL,
            file_size_bytes INTEGER NOT NULL,
            checksum_sha256 TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE (host_id, relative_path)
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_measurement_file_measurement ON measurement_file(measurement_id)",
    )
    .execute(&mut *conn)
    .await?;

    Ok(())
}
