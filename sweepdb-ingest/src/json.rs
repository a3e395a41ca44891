//! Helpers for loosely typed JSON documents

use serde_json::Value;

/// Finite number, or a string holding one
///
/// `"nan"`, `"inf"` and friends parse as `f64` but are not measurements, so
/// they are rejected like any other non-numeric value.
pub(crate) fn numeric(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    number.filter(|v: &f64| v.is_finite())
}
