//! Measured curve vs. benchmark analysis

pub mod benchmark;
pub mod deviation;

pub use benchmark::{load_benchmark_column, BenchmarkSlot};
pub use deviation::{
    deviation, AnalysisWindow, DeviationAnalyzer, DeviationReport, PassFailRule, Verdict,
};
