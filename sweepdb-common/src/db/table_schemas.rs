//! Table schema definitions
//!
//! Single source of truth for the catalog tables. The `CREATE TABLE`
//! statements in [`crate::db::init`] carry the columns the first catalog
//! release shipped with; anything listed here but missing from an existing
//! database is added by [`sync_catalog_schema`].

use crate::db::schema_sync::{sync_table, ColumnDefinition, TableSchema};
use crate::Result;
use sqlx::SqliteConnection;
use tracing::info;

/// Provenance hosts
pub struct FileHostTableSchema;

impl TableSchema for FileHostTableSchema {
    fn table_name() -> &'static str {
        "file_host"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("id", "INTEGER").primary_key(),
            ColumnDefinition::new("host_name", "TEXT").not_null(),
            ColumnDefinition::new("base_url", "TEXT").not_null(),
            ColumnDefinition::new("created_at", "TIMESTAMP")
                .not_null()
                .default("CURRENT_TIMESTAMP"),
        ]
    }
}

/// Canonical measurement metadata
pub struct MeasurementTableSchema;

impl TableSchema for MeasurementTableSchema {
    fn table_name() -> &'static str {
        "measurement"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("id", "TEXT").primary_key(),
            ColumnDefinition::new("title", "TEXT").not_null(),
            ColumnDefinition::new("unit_type", "TEXT"),
            ColumnDefinition::new("unit_number", "INTEGER"),
            ColumnDefinition::new("smoothing", "TEXT"),
            ColumnDefinition::new("start_freq", "REAL"),
            ColumnDefinition::new("end_freq", "REAL"),
            ColumnDefinition::new("ppo", "REAL"),
            ColumnDefinition::new("freq_step", "REAL"),
            ColumnDefinition::new("rew_version", "TEXT"),
            ColumnDefinition::new("notes", "TEXT"),
            ColumnDefinition::new("measured_at", "TIMESTAMP"),
            ColumnDefinition::new("created_at", "TIMESTAMP")
                .not_null()
                .default("CURRENT_TIMESTAMP"),
            // Curve summary statistics (added after first release)
            ColumnDefinition::new("freq_min", "REAL"),
            ColumnDefinition::new("freq_max", "REAL"),
            ColumnDefinition::new("freq_count", "INTEGER"),
            ColumnDefinition::new("spl_min", "REAL"),
            ColumnDefinition::new("spl_max", "REAL"),
            ColumnDefinition::new("spl_count", "INTEGER"),
        ]
    }
}

/// Files observed on disk
pub struct MeasurementFileTableSchema;

impl TableSchema for MeasurementFileTableSchema {
    fn table_name() -> &'static str {
        "measurement_file"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("id", "INTEGER").primary_key(),
            ColumnDefinition::new("measurement_id", "TEXT"),
            ColumnDefinition::new("kind", "TEXT").not_null(),
            ColumnDefinition::new("host_id", "INTEGER").not_null(),
            ColumnDefinition::new("relative_path", "TEXT").not_null(),
            ColumnDefinition::new("file_size_bytes", "INTEGER").not_null(),
            ColumnDefinition::new("checksum_sha256", "TEXT").not_null(),
            ColumnDefinition::new("created_at", "TIMESTAMP")
                .not_null()
                .default("CURRENT_TIMESTAMP"),
        ]
    }
}

/// Add missing columns to every catalog table
///
/// Idempotent. Pass a transaction to make the additions part of it.
pub async fn sync_catalog_schema(conn: &mut SqliteConnection) -> Result<()> {
    let mut added = sync_table::<FileHostTableSchema>(conn).await?;
    added.extend(sync_table::<MeasurementTableSchema>(conn).await?);
    added.extend(sync_table::<MeasurementFileTableSchema>(conn).await?);

    if !added.is_empty() {
        info!("Catalog schema evolved: added {} column(s): {}", added.len(), added.join(", "));
    }

    Ok(())
}
