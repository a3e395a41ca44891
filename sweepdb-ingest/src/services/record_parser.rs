//! Exported-result document → canonical [`Measurement`]
//!
//! Exported documents come from several generations of capture tooling, so
//! the parser is lenient: anything it cannot interpret becomes an absent
//! field instead of an error. Only bytes that are not JSON at all fail
//! (`UnparseableDocument`).
//!
//! Identity, in priority order:
//! 1. `Meta Data.UUID` (or `uuid`), if it parses as a UUID
//! 2. UUIDv5 of the data-root-relative path
//! 3. a fresh UUIDv4 (no path known; not stable across runs)

use crate::error::{IngestError, IngestResult};
use crate::json::numeric;
use crate::models::{Measurement, SummaryStats, UnitType};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};
use std::path::Path;
use sweepdb_common::uuid_utils;
use uuid::Uuid;

/// Document keys
pub mod keys {
    pub const META: &str = "Meta Data";
    pub const FILENAME: &str = "filename";
    pub const FREQ: &str = "Freq(Hz)";
    pub const SPL: &str = "SPL(dB)";
    pub const FUNDAMENTAL: &str = "Fundamental (dB)";
    pub const PPO: &str = "ppo";
    pub const FREQ_STEP: &str = "freqStep";

    pub const TITLE: &str = "Measurement";
    pub const UUID: [&str; 2] = ["UUID", "uuid"];
    pub const SMOOTHING: &str = "Smoothing";
    pub const START_FREQ: &str = "Start Frequency";
    pub const END_FREQ: &str = "End Frequency";
    pub const APP_VERSION: [&str; 2] = ["REW Version", "rew version"];
    pub const NOTES: [&str; 2] = ["notes", "Notes"];
    pub const DATE: [&str; 2] = ["Dated", "Date"];
}

/// Naive timestamp layouts accepted in `Dated`/`Date`
const NAIVE_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y-%b-%d %H:%M:%S",
    "%Y-%b-%d %H:%M",
];

/// Parse raw document bytes
///
/// `path` is only used for error context and the title fallback.
pub fn parse_measurement_bytes(
    bytes: &[u8],
    path: &Path,
    relative_path: Option<&str>,
) -> IngestResult<Measurement> {
    let document: Value =
        serde_json::from_slice(bytes).map_err(|source| IngestError::UnparseableDocument {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(parse_measurement(&document, path, relative_path))
}

/// Normalize a parsed export document
pub fn parse_measurement(document: &Value, path: &Path, relative_path: Option<&str>) -> Measurement {
    let empty = Map::new();
    let root = document.as_object().unwrap_or(&empty);
    let meta = root
        .get(keys::META)
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    let title = non_empty_str(meta.get(keys::TITLE))
        .or_else(|| non_empty_str(root.get(keys::FILENAME)))
        .map(str::to_string)
        .unwrap_or_else(|| file_stem(path));

    let mut measurement = Measurement::new(resolve_identity(meta, relative_path), title);

    if let Some((unit, number)) = UnitType::classify_title(&measurement.title) {
        measurement.unit_type = Some(unit);
        measurement.unit_number = Some(i64::from(number));
    }

    measurement.smoothing = meta.get(keys::SMOOTHING).and_then(text);
    measurement.start_freq = meta.get(keys::START_FREQ).and_then(numeric);
    measurement.end_freq = meta.get(keys::END_FREQ).and_then(numeric);
    measurement.ppo = root.get(keys::PPO).and_then(numeric);
    measurement.freq_step = root.get(keys::FREQ_STEP).and_then(numeric);
    measurement.rew_version = first_text(meta, &keys::APP_VERSION);
    measurement.notes = first_text(meta, &keys::NOTES);
    measurement.measured_at = first_text(meta, &keys::DATE).and_then(|raw| parse_timestamp(&raw));

    measurement.freq_stats = root.get(keys::FREQ).and_then(summarize);
    measurement.spl_stats = root
        .get(keys::SPL)
        .or_else(|| root.get(keys::FUNDAMENTAL))
        .and_then(summarize);

    measurement
}

fn resolve_identity(meta: &Map<String, Value>, relative_path: Option<&str>) -> Uuid {
    let embedded = keys::UUID
        .iter()
        .find_map(|key| meta.get(*key).and_then(text))
        .and_then(|raw| match uuid_utils::parse(&raw) {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::debug!(value = %raw, "Ignoring malformed embedded UUID: {}", e);
                None
            }
        });

    match (embedded, relative_path) {
        (Some(id), _) => id,
        (None, Some(rel)) => uuid_utils::from_relative_path(rel),
        (None, None) => {
            tracing::warn!("No embedded UUID and no path; measurement identity will not be stable");
            uuid_utils::generate()
        }
    }
}

/// min/max/count, or `None` if the array is missing, empty, or has any
/// non-numeric or non-finite element
pub fn summarize(value: &Value) -> Option<SummaryStats> {
    let values = value
        .as_array()?
        .iter()
        .map(numeric)
        .collect::<Option<Vec<f64>>>()?;
    SummaryStats::from_values(&values)
}

/// Parse a capture timestamp; unknown layouts yield `None`
///
/// Offset-bearing timestamps are normalized to UTC.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.naive_utc());
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.trim().is_empty())
}

/// Scalar as text; null, empty strings and containers are absent
fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn first_text(meta: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| meta.get(*key).and_then(text))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "untitled".to_string())
}
