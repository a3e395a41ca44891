//! Benchmark curves
//!
//! Benchmarks are reference documents stored next to the capture tooling,
//! one per slot. Swept-sine benchmarks carry `Freq(Hz)` / `SPL(dB)` columns;
//! the stepped-sine benchmark carries a `data` column laid out as one list
//! per stepped frequency, which is flattened in order.

use crate::analysis::deviation::PassFailRule;
use crate::error::{IngestError, IngestResult};
use crate::json::numeric;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Benchmark slots, numbered as the operator selects them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BenchmarkSlot {
    Vibration,
    Acoustic,
    SteppedSineVibration,
    SteppedSineAcoustic,
}

impl BenchmarkSlot {
    pub const ALL: [BenchmarkSlot; 4] = [
        BenchmarkSlot::Vibration,
        BenchmarkSlot::Acoustic,
        BenchmarkSlot::SteppedSineVibration,
        BenchmarkSlot::SteppedSineAcoustic,
    ];

    pub fn from_slot(slot: u8) -> IngestResult<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.slot() == slot)
            .ok_or(IngestError::UnknownBenchmarkSlot(slot))
    }

    pub fn slot(self) -> u8 {
        match self {
            BenchmarkSlot::Vibration => 1,
            BenchmarkSlot::Acoustic => 2,
            BenchmarkSlot::SteppedSineVibration => 3,
            BenchmarkSlot::SteppedSineAcoustic => 4,
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            BenchmarkSlot::Vibration => "benchmark-vibration.json",
            BenchmarkSlot::Acoustic => "benchmark-acoustic.json",
            BenchmarkSlot::SteppedSineVibration | BenchmarkSlot::SteppedSineAcoustic => {
                "stepped-sine benchmark.json"
            }
        }
    }

    /// Column holding the benchmark amplitudes
    pub fn amplitude_column(self) -> &'static str {
        if self.is_stepped() {
            "data"
        } else {
            "SPL(dB)"
        }
    }

    pub fn is_stepped(self) -> bool {
        matches!(
            self,
            BenchmarkSlot::SteppedSineVibration | BenchmarkSlot::SteppedSineAcoustic
        )
    }

    /// Pass/fail rule used for measurements judged against this slot
    pub fn rule(self) -> PassFailRule {
        if self.is_stepped() {
            PassFailRule::stepped_sine()
        } else {
            PassFailRule::swept_sine()
        }
    }

    pub fn path_in(self, benchmark_dir: &Path) -> PathBuf {
        benchmark_dir.join(self.file_name())
    }

    /// Load this slot's amplitude column from `benchmark_dir`
    pub fn load_amplitudes(self, benchmark_dir: &Path) -> IngestResult<Vec<f64>> {
        load_benchmark_column(&self.path_in(benchmark_dir), self.amplitude_column())
    }
}

/// Read one numeric column from a benchmark document
///
/// Elements may be numbers or numeric strings. A column of lists is
/// flattened row by row.
pub fn load_benchmark_column(path: &Path, column: &str) -> IngestResult<Vec<f64>> {
    let bytes = std::fs::read(path).map_err(|e| IngestError::unreadable(path, e))?;
    let document: Value = serde_json::from_slice(&bytes).map_err(|e| unparseable(path, e))?;

    let values = document
        .get(column)
        .and_then(Value::as_array)
        .ok_or_else(|| unparseable(path, de_error(format!("missing array column {:?}", column))))?;

    let rows_are_lists = !values.is_empty() && values.iter().all(Value::is_array);
    let flat: Vec<&Value> = if rows_are_lists {
        values.iter().filter_map(Value::as_array).flatten().collect()
    } else {
        values.iter().collect()
    };

    flat.into_iter()
        .enumerate()
        .map(|(i, v)| {
            numeric(v).ok_or_else(|| {
                unparseable(path, de_error(format!("non-numeric value at {}[{}]", column, i)))
            })
        })
        .collect()
}

fn de_error(message: String) -> serde_json::Error {
    <serde_json::Error as serde::de::Error>::custom(message)
}

fn unparseable(path: &Path, source: serde_json::Error) -> IngestError {
    IngestError::UnparseableDocument {
        path: path.to_path_buf(),
        source,
    }
}
