//! Exported-result document writer
//!
//! Swept-sine curves go to `json/` as `{filename, Freq(Hz), SPL(dB), Meta Data}`
//! plus the axis parameter that rebuilds `Freq(Hz)`. Stepped-sine distortion
//! tables go to `stepped-sine/`, one array per distortion column. Both
//! layouts are read back by the record parser.

use crate::error::{IngestError, IngestResult};
use crate::services::data_layout::DataLayout;
use crate::signal::DecodedCurve;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Values per frequency row of a stepped-sine distortion table
pub const STEPPED_STRIDE: usize = 15;

/// Distortion table columns, in row order
pub const STEPPED_COLUMNS: [&str; STEPPED_STRIDE] = [
    "Freq(Hz)",
    "Fundamental (dB)",
    "THD(%)",
    "THD+N(%)",
    "N(%)",
    "Noise (%)",
    "H2 (%)",
    "H3 (%)",
    "H4 (%)",
    "H5 (%)",
    "H6 (%)",
    "H7 (%)",
    "H8 (%)",
    "H9 (%)",
    "H10 (%)",
];

/// Measurement metadata as listed by the measurement application
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementSummary {
    pub title: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub rew_version: Option<String>,
    #[serde(default)]
    pub start_freq: Option<f64>,
    #[serde(default)]
    pub end_freq: Option<f64>,
}

#[derive(Serialize)]
struct SweepMeta<'a> {
    #[serde(rename = "REW Version")]
    rew_version: Option<&'a str>,
    #[serde(rename = "Dated")]
    dated: Option<&'a str>,
    #[serde(rename = "UUID")]
    uuid: Option<&'a str>,
    notes: Option<&'a str>,
    #[serde(rename = "Measurement")]
    measurement: &'a str,
    #[serde(rename = "Start Frequency")]
    start_freq: Option<f64>,
    #[serde(rename = "End Frequency")]
    end_freq: Option<f64>,
    #[serde(rename = "Smoothing")]
    smoothing: Option<&'a str>,
}

#[derive(Serialize)]
struct SweepDocument<'a> {
    filename: &'a str,
    #[serde(rename = "Freq(Hz)")]
    freq: &'a [f64],
    #[serde(rename = "SPL(dB)")]
    spl: Vec<f64>,
    #[serde(rename = "Meta Data")]
    meta: SweepMeta<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ppo: Option<f64>,
    #[serde(rename = "freqStep", skip_serializing_if = "Option::is_none")]
    freq_step: Option<f64>,
}

#[derive(Serialize)]
struct SteppedMeta<'a> {
    #[serde(rename = "Measurement")]
    measurement: &'a str,
    #[serde(rename = "Notes")]
    notes: Option<&'a str>,
    #[serde(rename = "Date")]
    date: Option<&'a str>,
    uuid: Option<&'a str>,
    #[serde(rename = "rew version")]
    rew_version: Option<&'a str>,
    #[serde(rename = "Start Frequency")]
    start_freq: Option<f64>,
    #[serde(rename = "End Frequency")]
    end_freq: Option<f64>,
}

#[derive(Serialize)]
struct SteppedDocument<'a> {
    filename: &'a str,
    #[serde(flatten)]
    columns: BTreeMap<&'static str, Vec<f64>>,
    #[serde(rename = "Meta Data")]
    meta: SteppedMeta<'a>,
}

/// Writes exported-result documents below a data root
pub struct ExportWriter {
    layout: DataLayout,
}

impl ExportWriter {
    pub fn new(layout: DataLayout) -> Self {
        Self { layout }
    }

    /// Write a swept-sine curve to `json/<sanitized name>.json`
    pub fn write_sweep(
        &self,
        name: &str,
        curve: &DecodedCurve,
        summary: &MeasurementSummary,
    ) -> IngestResult<PathBuf> {
        let document = SweepDocument {
            filename: name,
            freq: &curve.frequencies,
            spl: curve.amplitudes_f64(),
            meta: SweepMeta {
                rew_version: summary.rew_version.as_deref(),
                dated: summary.date.as_deref(),
                uuid: summary.uuid.as_deref(),
                notes: summary.notes.as_deref(),
                measurement: &summary.title,
                start_freq: summary.start_freq,
                end_freq: summary.end_freq,
                smoothing: curve.smoothing.as_deref(),
            },
            ppo: curve.axis.freq_step.is_none().then_some(curve.axis.ppo).flatten(),
            freq_step: curve.axis.freq_step,
        };

        write_document(&self.layout.json_dir(), name, &document)
    }

    /// Write a flat stepped-sine distortion table to
    /// `stepped-sine/<sanitized name>.json`
    ///
    /// Fails with `MalformedPayload` when the table is not a whole number of
    /// rows.
    pub fn write_stepped(
        &self,
        name: &str,
        table: &[f64],
        summary: &MeasurementSummary,
    ) -> IngestResult<PathBuf> {
        let document = SteppedDocument {
            filename: name,
            columns: deinterleave(table)?,
            meta: SteppedMeta {
                measurement: &summary.title,
                notes: summary.notes.as_deref(),
                date: summary.date.as_deref(),
                uuid: summary.uuid.as_deref(),
                rew_version: summary.rew_version.as_deref(),
                start_freq: summary.start_freq,
                end_freq: summary.end_freq,
            },
        };

        write_document(&self.layout.stepped_sine_dir(), name, &document)
    }
}

/// Split a row-major distortion table into its named columns
pub fn deinterleave(table: &[f64]) -> IngestResult<BTreeMap<&'static str, Vec<f64>>> {
    if table.len() % STEPPED_STRIDE != 0 {
        return Err(IngestError::MalformedPayload(format!(
            "distortion table length {} is not a multiple of {}",
            table.len(),
            STEPPED_STRIDE
        )));
    }

    Ok(STEPPED_COLUMNS
        .iter()
        .enumerate()
        .map(|(offset, column)| {
            let values = table.iter().skip(offset).step_by(STEPPED_STRIDE).copied().collect();
            (*column, values)
        })
        .collect())
}

fn write_document<T: Serialize>(dir: &Path, name: &str, document: &T) -> IngestResult<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| IngestError::unreadable(dir, e))?;

    let path = dir.join(format!("{}.json", sanitize_filename(name)));
    let bytes = serde_json::to_vec_pretty(document)
        .map_err(|e| IngestError::Internal(format!("failed to serialize export: {}", e)))?;
    std::fs::write(&path, bytes).map_err(|e| IngestError::unreadable(&path, e))?;

    tracing::info!(path = %path.display(), "Wrote export");
    Ok(path)
}

/// Filesystem-safe file name (no separators or reserved characters)
pub fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            '\n' | '\r' | '\t' => ' ',
            c => c,
        })
        .collect();

    let safe = replaced.trim().trim_matches('.');
    if safe.is_empty() {
        "untitled".to_string()
    } else {
        safe.to_string()
    }
}
