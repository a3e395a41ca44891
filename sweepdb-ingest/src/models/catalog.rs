//! Catalog records: hosts, files on disk, measurements

use crate::error::{IngestError, IngestResult};
use crate::models::unit::UnitType;
use chrono::NaiveDateTime;
use uuid::Uuid;

/// Provenance source; unique by `(host_name, base_url)`, never mutated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Host {
    pub id: i64,
    pub host_name: String,
    pub base_url: String,
}

/// Closed set of cataloged file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Vendor binary project bundle; never linked to a measurement
    Mdat,
    /// Exported-result document; linked to exactly one measurement
    Json,
}

impl FileKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FileKind::Mdat => "mdat",
            FileKind::Json => "json",
        }
    }

    /// File extension (without dot), matched case-insensitively
    pub fn extension(self) -> &'static str {
        self.as_str()
    }

    /// Subdirectory of the data root holding this kind
    pub fn directory(self) -> &'static str {
        self.as_str()
    }

    /// Whether files of this kind are searched below their directory
    pub fn recursive(self) -> bool {
        matches!(self, FileKind::Json)
    }

    pub fn parse(value: &str) -> IngestResult<Self> {
        match value {
            "mdat" => Ok(FileKind::Mdat),
            "json" => Ok(FileKind::Json),
            other => Err(IngestError::Internal(format!("unknown file kind in catalog: {}", other))),
        }
    }
}

/// File observed on disk, unique by `(host_id, relative_path)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasurementFile {
    pub id: i64,
    pub measurement_id: Option<Uuid>,
    pub kind: FileKind,
    pub host_id: i64,
    /// Relative to the data root, forward-slash separated
    pub relative_path: String,
    pub file_size_bytes: i64,
    pub checksum_sha256: String,
}

/// min / max / count over one curve array
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryStats {
    pub min: f64,
    pub max: f64,
    pub count: i64,
}

impl SummaryStats {
    /// `None` for an empty slice or one holding NaN or an infinity
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() || values.iter().any(|v| !v.is_finite()) {
            return None;
        }
        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        Some(Self {
            min,
            max,
            count: values.len() as i64,
        })
    }
}

/// Canonical metadata for one exported result
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub id: Uuid,
    pub title: String,
    pub unit_type: Option<UnitType>,
    pub unit_number: Option<i64>,
    pub smoothing: Option<String>,
    pub start_freq: Option<f64>,
    pub end_freq: Option<f64>,
    pub ppo: Option<f64>,
    pub freq_step: Option<f64>,
    pub rew_version: Option<String>,
    pub notes: Option<String>,
    pub measured_at: Option<NaiveDateTime>,
    pub freq_stats: Option<SummaryStats>,
    pub spl_stats: Option<SummaryStats>,
}

impl Measurement {
    /// Record with only identity and title set
    pub fn new(id: Uuid, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            unit_type: None,
            unit_number: None,
            smoothing: None,
            start_freq: None,
            end_freq: None,
            ppo: None,
            freq_step: None,
            rew_version: None,
            notes: None,
            measured_at: None,
            freq_stats: None,
            spl_stats: None,
        }
    }
}
