//! Unit-under-test classification

use crate::error::{IngestError, IngestResult};
use std::fmt;
use std::str::FromStr;

/// Kind of transducer under test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitType {
    ResonX,
    BassShaker,
    Exciter,
    Thruster,
}

impl UnitType {
    pub const ALL: [UnitType; 4] = [
        UnitType::ResonX,
        UnitType::BassShaker,
        UnitType::Exciter,
        UnitType::Thruster,
    ];

    /// Parse a one-letter operator code (case-insensitive)
    pub fn from_code(code: &str) -> IngestResult<Self> {
        let code = code.trim();
        Self::ALL
            .into_iter()
            .find(|unit| unit.code().eq_ignore_ascii_case(code))
            .ok_or_else(|| IngestError::UnknownUnitType(code.to_string()))
    }

    /// Parse a canonical label (exact match)
    pub fn from_display_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|unit| unit.display_name() == name)
    }

    /// One-letter operator code
    pub fn code(self) -> &'static str {
        match self {
            UnitType::ResonX => "r",
            UnitType::BassShaker => "b",
            UnitType::Exciter => "e",
            UnitType::Thruster => "t",
        }
    }

    /// Canonical label
    pub fn display_name(self) -> &'static str {
        match self {
            UnitType::ResonX => "ResonX",
            UnitType::BassShaker => "Bass Shaker",
            UnitType::Exciter => "Exciter",
            UnitType::Thruster => "Thruster",
        }
    }

    /// Measurement name for unit `number`, e.g. `"Bass Shaker 12"`
    pub fn unit_label(self, number: u32) -> String {
        format!("{} {}", self.display_name(), number)
    }

    /// Split a title of the form `<label> <number>`
    ///
    /// Anything else (extra words, missing number, unknown label) is `None`.
    pub fn classify_title(title: &str) -> Option<(Self, u32)> {
        let (label, number) = title.trim().rsplit_once(' ')?;
        let unit = Self::from_display_name(label.trim_end())?;
        let number = number.parse().ok()?;
        Some((unit, number))
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for UnitType {
    type Err = IngestError;

    /// Accepts either the operator code or the canonical label
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_display_name(s.trim()).map_or_else(|| Self::from_code(s), Ok)
    }
}
