//! sweepdb-ingest library
//!
//! Measurement ingestion core:
//! - `signal`: amplitude payload decoding and frequency-axis reconstruction
//! - `analysis`: deviation against benchmark curves and the pass/fail rule
//! - `services`: data-root scanning, export parsing/writing, catalog sync
//! - `db`: catalog queries used by the synchronizer

pub mod analysis;
pub mod db;
pub mod error;
mod json;
pub mod models;
pub mod services;
pub mod signal;

pub use crate::error::{IngestError, IngestResult};
pub use crate::services::{CatalogSynchronizer, SyncReport};
