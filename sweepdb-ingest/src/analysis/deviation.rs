//! Deviation against a benchmark curve and the pass/fail rule
//!
//! `diff[i] = benchmark[i] - measured[i]` over the shorter of the two
//! curves. The sign is kept so over- and under-performance stay visible;
//! the pass/fail rule looks at magnitudes only.
//!
//! A unit fails when either:
//! - more than `fail_budget` samples inside the analysis window deviate by
//!   more than `threshold`, or
//! - the deviation sequence is shorter than `min_length` (incomplete data).
//!
//! Swept-sine and stepped-sine tests share the rule; they differ only in the
//! parameters of their [`PassFailRule`].

use std::ops::Range;

/// Signed deviation, `benchmark - measured`, no padding
pub fn deviation(benchmark: &[f64], measured: &[f64]) -> Vec<f64> {
    benchmark
        .iter()
        .zip(measured)
        .map(|(b, m)| b - m)
        .collect()
}

/// Band of the sweep that counts toward failures, expressed in sample indices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisWindow {
    /// Frequency of sample 0 (Hz)
    pub start_freq: f64,
    /// Spacing between samples (Hz)
    pub freq_step: f64,
    /// Lower band edge (Hz)
    pub band_low: f64,
    /// Upper band edge (Hz), exclusive
    pub band_high: f64,
}

impl AnalysisWindow {
    /// 30 Hz to 10 kHz on the standard sweep grid
    pub const STANDARD_SWEEP: Self = Self {
        start_freq: 2.1972656,
        freq_step: 0.36621097,
        band_low: 30.0,
        band_high: 10_000.0,
    };

    fn index_of(&self, freq: f64) -> usize {
        ((freq - self.start_freq) / self.freq_step).round().max(0.0) as usize
    }

    /// Unclipped `[start, end)` sample indices of the band
    pub fn bounds(&self) -> Range<usize> {
        self.index_of(self.band_low)..self.index_of(self.band_high)
    }

    /// Bounds clipped to a sequence of `len` samples
    pub fn clipped(&self, len: usize) -> Range<usize> {
        let Range { start, end } = self.bounds();
        start.min(len)..end.min(len).max(start.min(len))
    }
}

/// Parameterized pass/fail rule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassFailRule {
    pub window: AnalysisWindow,
    /// Absolute deviation above which a sample counts as a failure (dB)
    pub threshold: f64,
    /// Failures tolerated inside the window
    pub fail_budget: usize,
    /// Minimum deviation length for the data to count as complete
    pub min_length: usize,
}

impl PassFailRule {
    pub const DEFAULT_THRESHOLD: f64 = 25.0;
    pub const DEFAULT_FAIL_BUDGET: usize = 900;
    pub const DEFAULT_MIN_LENGTH: usize = 54_000;

    /// Rule for swept-sine frequency responses
    pub const fn swept_sine() -> Self {
        Self {
            window: AnalysisWindow::STANDARD_SWEEP,
            threshold: Self::DEFAULT_THRESHOLD,
            fail_budget: Self::DEFAULT_FAIL_BUDGET,
            min_length: Self::DEFAULT_MIN_LENGTH,
        }
    }

    /// Rule for stepped-sine distortion tables (currently the same numbers)
    pub const fn stepped_sine() -> Self {
        Self::swept_sine()
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_fail_budget(mut self, fail_budget: usize) -> Self {
        self.fail_budget = fail_budget;
        self
    }

    /// Judge a signed deviation sequence
    pub fn evaluate(&self, deviation: &[f64]) -> Verdict {
        let window = self.window.clipped(deviation.len());
        let exceedances = deviation[window.clone()]
            .iter()
            .filter(|d| d.abs() > self.threshold)
            .count();

        Verdict {
            exceedances,
            fail_budget: self.fail_budget,
            length: deviation.len(),
            min_length: self.min_length,
            window,
        }
    }
}

impl Default for PassFailRule {
    fn default() -> Self {
        Self::swept_sine()
    }
}

/// Outcome of a pass/fail evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    /// Samples inside the window above the threshold
    pub exceedances: usize,
    pub fail_budget: usize,
    /// Length of the deviation sequence
    pub length: usize,
    pub min_length: usize,
    /// Window actually inspected (clipped to `length`)
    pub window: Range<usize>,
}

impl Verdict {
    pub fn is_complete(&self) -> bool {
        self.length >= self.min_length
    }

    pub fn within_budget(&self) -> bool {
        self.exceedances <= self.fail_budget
    }

    pub fn passed(&self) -> bool {
        self.is_complete() && self.within_budget()
    }
}

/// Deviation sequence plus its verdict
#[derive(Debug, Clone, PartialEq)]
pub struct DeviationReport {
    pub deviation: Vec<f64>,
    pub verdict: Verdict,
}

/// Compares measured curves to a benchmark under one rule
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviationAnalyzer {
    rule: PassFailRule,
}

impl DeviationAnalyzer {
    pub fn new(rule: PassFailRule) -> Self {
        Self { rule }
    }

    pub fn rule(&self) -> &PassFailRule {
        &self.rule
    }

    pub fn analyze(&self, benchmark: &[f64], measured: &[f64]) -> DeviationReport {
        let deviation = deviation(benchmark, measured);
        let verdict = self.rule.evaluate(&deviation);

        tracing::debug!(
            length = verdict.length,
            exceedances = verdict.exceedances,
            passed = verdict.passed(),
            "Deviation analyzed"
        );

        DeviationReport { deviation, verdict }
    }
}
