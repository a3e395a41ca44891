//! Error types for sweepdb-ingest
//!
//! Severity follows where the failure happens:
//! - per-curve (`MalformedPayload`): skip that curve
//! - per-axis (`InvalidAxisParameters`): degrade to an empty axis
//! - per-file (`UnparseableDocument`): skip that file, keep syncing
//! - per-run (`UnreadableFile`, `CatalogWrite`, `Scan`): roll back and surface

use crate::services::file_scanner::ScanError;
use std::path::PathBuf;
use thiserror::Error;

/// Ingest error type
#[derive(Debug, Error)]
pub enum IngestError {
    /// Binary curve payload could not be decoded
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Frequency-axis parameters cannot produce a valid axis
    #[error("Invalid axis parameters: {0}")]
    InvalidAxisParameters(String),

    /// File could not be opened, read or hashed
    #[error("Unreadable file {path}: {source}")]
    UnreadableFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Export document is not valid structured data
    #[error("Unparseable document {path}: {source}")]
    UnparseableDocument {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Catalog upsert failed (constraint violation, connectivity)
    #[error("Catalog write failed: {0}")]
    CatalogWrite(#[from] sqlx::Error),

    /// Directory enumeration failed
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// Unit type code outside the known set
    #[error("Unknown unit type: {0:?}")]
    UnknownUnitType(String),

    /// Benchmark slot number outside the known set
    #[error("Unknown benchmark slot: {0}")]
    UnknownBenchmarkSlot(u8),

    /// sweepdb-common error (schema sync, config)
    #[error(transparent)]
    Common(#[from] sweepdb_common::Error),

    /// Background task failed to complete
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IngestError {
    pub(crate) fn unreadable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::UnreadableFile {
            path: path.into(),
            source,
        }
    }

    /// Errors after which the current sync run must not continue
    pub fn aborts_run(&self) -> bool {
        !matches!(
            self,
            IngestError::UnparseableDocument { .. } | IngestError::MalformedPayload(_)
        )
    }
}

/// Result type for ingest operations
pub type IngestResult<T> = Result<T, IngestError>;
