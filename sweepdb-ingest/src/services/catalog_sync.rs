//! Catalog synchronization
//!
//! One run walks a data root and brings the catalog in line with it:
//!
//! 1. Container bundles (`mdat/*.mdat`): checksum, then insert or refresh the
//!    file row. Container rows are never linked to a measurement.
//! 2. Exported results (`json/**/*.json`): checksum, parse, upsert the
//!    measurement by identity (full replace), then upsert the file row linked
//!    to it.
//!
//! The whole run is one transaction, schema evolution included. Any fatal
//! error drops the transaction, so the catalog is left exactly as it was
//! before the run. Documents that
//! are not JSON are skipped and reported; they do not abort the run.
//!
//! Files are visited in path order so runs and their logs are reproducible.
//! Nothing is kept between runs except the catalog itself.

use crate::db::{files, hosts, measurements};
use crate::error::IngestResult;
use crate::models::{FileKind, MeasurementFile};
use crate::services::checksum::{digest_file_blocking, read_with_digest, FileDigest};
use crate::services::file_scanner::{relative_path, FileScanner};
use crate::services::record_parser::parse_measurement_bytes;
use sqlx::{SqliteConnection, SqlitePool};
use std::path::{Path, PathBuf};
use std::time::Instant;
use sweepdb_common::config::HostDescriptor;
use sweepdb_common::db::{create_catalog_tables, sync_catalog_schema};
use uuid::Uuid;

/// Per-kind file outcome counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileCounts {
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
}

impl FileCounts {
    pub fn total(&self) -> usize {
        self.inserted + self.updated + self.unchanged
    }
}

/// File left out of the catalog, and why
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub relative_path: String,
    pub reason: String,
}

/// Outcome of one synchronization run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub host_id: i64,
    pub containers: FileCounts,
    pub exports: FileCounts,
    pub measurements_upserted: usize,
    pub skipped: Vec<SkippedFile>,
}

/// What a file upsert would do to an existing row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileChange {
    Inserted,
    Updated,
    Unchanged,
}

impl FileChange {
    fn classify(existing: Option<&MeasurementFile>, digest: &FileDigest, link: Option<Uuid>) -> Self {
        match existing {
            None => FileChange::Inserted,
            Some(file)
                if file.checksum_sha256 == digest.checksum_sha256
                    && u64::try_from(file.file_size_bytes).ok() == Some(digest.size_bytes)
                    && file.measurement_id == link =>
            {
                FileChange::Unchanged
            }
            Some(_) => FileChange::Updated,
        }
    }

    fn record(self, counts: &mut FileCounts) {
        match self {
            FileChange::Inserted => counts.inserted += 1,
            FileChange::Updated => counts.updated += 1,
            FileChange::Unchanged => counts.unchanged += 1,
        }
    }
}

/// Run-scoped state, created per run and returned as the report
struct SyncRun<'a> {
    data_root: &'a Path,
    host_id: i64,
    report: SyncReport,
}

impl<'a> SyncRun<'a> {
    fn new(data_root: &'a Path, host_id: i64) -> Self {
        Self {
            data_root,
            host_id,
            report: SyncReport {
                host_id,
                ..Default::default()
            },
        }
    }

    async fn sync_container(&mut self, conn: &mut SqliteConnection, path: PathBuf) -> IngestResult<()> {
        let rel = relative_path(self.data_root, &path)?;
        let digest = digest_file_blocking(path).await?;

        let existing = files::find_file(conn, self.host_id, &rel).await?;
        let change = FileChange::classify(existing.as_ref(), &digest, None);
        if change != FileChange::Unchanged {
            files::upsert_container_file(conn, self.host_id, &rel, &digest).await?;
        }
        change.record(&mut self.report.containers);

        tracing::debug!(path = %rel, checksum = %digest.checksum_sha256, ?change, "Container file synced");
        Ok(())
    }

    async fn sync_export(&mut self, conn: &mut SqliteConnection, path: PathBuf) -> IngestResult<()> {
        let rel = relative_path(self.data_root, &path)?;
        let (bytes, digest) = read_with_digest(path.clone()).await?;

        let measurement = match parse_measurement_bytes(&bytes, &path, Some(rel.as_str())) {
            Ok(measurement) => measurement,
            Err(e) if !e.aborts_run() => {
                tracing::warn!(path = %rel, "Skipping export: {}", e);
                self.report.skipped.push(SkippedFile {
                    relative_path: rel,
                    reason: e.to_string(),
                });
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        measurements::upsert_measurement(conn, &measurement).await?;
        self.report.measurements_upserted += 1;

        let existing = files::find_file(conn, self.host_id, &rel).await?;
        if let Some(previous) = existing.as_ref().and_then(|f| f.measurement_id) {
            if previous != measurement.id {
                tracing::debug!(path = %rel, %previous, current = %measurement.id, "Export relinked to another measurement");
            }
        }

        let change = FileChange::classify(existing.as_ref(), &digest, Some(measurement.id));
        if change != FileChange::Unchanged {
            files::upsert_export_file(conn, self.host_id, &rel, &digest, measurement.id).await?;
        }
        change.record(&mut self.report.exports);

        tracing::debug!(
            path = %rel,
            checksum = %digest.checksum_sha256,
            measurement_id = %measurement.id,
            ?change,
            "Export synced"
        );
        Ok(())
    }
}

/// Synchronizes a data root into the catalog
pub struct CatalogSynchronizer {
    pool: SqlitePool,
    scanner: FileScanner,
}

impl CatalogSynchronizer {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            scanner: FileScanner::new(),
        }
    }

    /// Run one synchronization of `data_root` on behalf of `host`
    ///
    /// Commits only if every file was processed; on error nothing from this
    /// run is visible in the catalog.
    pub async fn run(&self, data_root: &Path, host: &HostDescriptor) -> IngestResult<SyncReport> {
        let started = Instant::now();
        tracing::info!(data_root = %data_root.display(), host = %host.host_name, "Starting catalog sync");

        let containers = self.scanner.scan_kind(data_root, FileKind::Mdat)?;
        let exports = self.scanner.scan_kind(data_root, FileKind::Json)?;

        let mut tx = self.pool.begin().await?;

        create_catalog_tables(&mut tx).await?;
        sync_catalog_schema(&mut tx).await?;

        let host_row = hosts::ensure_host(&mut tx, &host.host_name, &host.base_url).await?;
        let mut run = SyncRun::new(data_root, host_row.id);

        for path in containers {
            run.sync_container(&mut tx, path).await?;
        }
        for path in exports {
            run.sync_export(&mut tx, path).await?;
        }

        tx.commit().await?;

        let report = run.report;
        tracing::info!(
            host_id = report.host_id,
            containers_inserted = report.containers.inserted,
            containers_updated = report.containers.updated,
            containers_unchanged = report.containers.unchanged,
            exports_inserted = report.exports.inserted,
            exports_updated = report.exports.updated,
            exports_unchanged = report.exports.unchanged,
            measurements = report.measurements_upserted,
            skipped = report.skipped.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Catalog sync committed"
        );

        Ok(report)
    }
}
