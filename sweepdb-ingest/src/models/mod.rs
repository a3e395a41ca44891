//! Data models for the measurement catalog
//!
//! - [`Host`], [`MeasurementFile`], [`Measurement`]: persisted catalog rows
//! - [`UnitType`]: closed classification of units under test

pub mod catalog;
pub mod unit;

pub use catalog::{FileKind, Host, Measurement, MeasurementFile, SummaryStats};
pub use unit::UnitType;
