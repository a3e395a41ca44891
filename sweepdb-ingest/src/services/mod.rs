//! Ingestion services: scanning, hashing, parsing, exporting, synchronizing

pub mod catalog_sync;
pub mod checksum;
pub mod data_layout;
pub mod export_writer;
pub mod file_scanner;
pub mod record_parser;

pub use catalog_sync::{CatalogSynchronizer, FileCounts, SkippedFile, SyncReport};
pub use checksum::{digest_file, FileDigest};
pub use data_layout::DataLayout;
pub use export_writer::{sanitize_filename, ExportWriter, MeasurementSummary};
pub use file_scanner::{FileScanner, ScanError};
pub use record_parser::{parse_measurement, parse_measurement_bytes, parse_timestamp};
