//! Decoded frequency-response curve

use crate::error::{IngestError, IngestResult};
use crate::signal::decoder::decode_base64;
use crate::signal::frequency_axis::AxisParameters;
use serde::{Deserialize, Serialize};

/// Frequency response as returned by the measurement application's query API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyResponse {
    /// Base64 big-endian `f32` amplitudes
    pub magnitude: String,
    #[serde(default)]
    pub phase: Option<String>,
    #[serde(flatten)]
    pub axis: AxisParameters,
    #[serde(default)]
    pub smoothing: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
}

/// Amplitude samples with their (possibly absent) frequency axis
///
/// Transient: built during capture/export and at analysis time, never
/// persisted as its own entity.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedCurve {
    pub amplitudes: Vec<f32>,
    /// Same length as `amplitudes`, or empty when the axis could not be rebuilt
    pub frequencies: Vec<f64>,
    pub axis: AxisParameters,
    pub smoothing: Option<String>,
}

impl DecodedCurve {
    /// Decode amplitudes and rebuild the axis
    ///
    /// A malformed magnitude payload fails the curve. Bad axis parameters do
    /// not: the curve is returned without an axis and a warning is logged.
    pub fn from_response(response: &FrequencyResponse) -> IngestResult<Self> {
        let amplitudes = decode_base64(&response.magnitude)?;

        let frequencies = match response.axis.build(amplitudes.len()) {
            Ok(frequencies) => frequencies,
            Err(e) => {
                tracing::warn!(samples = amplitudes.len(), "Proceeding without frequency axis: {}", e);
                Vec::new()
            }
        };

        Ok(Self {
            amplitudes,
            frequencies,
            axis: response.axis,
            smoothing: response.smoothing.clone(),
        })
    }

    /// Decode from an untyped JSON response body
    pub fn from_json(value: &serde_json::Value) -> IngestResult<Self> {
        let response: FrequencyResponse = serde_json::from_value(value.clone())
            .map_err(|e| IngestError::MalformedPayload(format!("unexpected response shape: {}", e)))?;
        Self::from_response(&response)
    }

    pub fn len(&self) -> usize {
        self.amplitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amplitudes.is_empty()
    }

    pub fn has_axis(&self) -> bool {
        !self.frequencies.is_empty() && self.frequencies.len() == self.amplitudes.len()
    }

    /// Amplitudes widened to `f64` (export and analysis precision)
    pub fn amplitudes_f64(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|&a| f64::from(a)).collect()
    }

    /// `(frequency, amplitude)` pairs, if the axis is present
    pub fn points(&self) -> Option<impl Iterator<Item = (f64, f32)> + '_> {
        self.has_axis()
            .then(|| self.frequencies.iter().copied().zip(self.amplitudes.iter().copied()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::decoder::encode_base64;
    use serde_json::json;

    #[test]
    fn test_from_json_linear() {
        let body = json!({
            "magnitude": encode_base64(&[70.0, 71.5, 72.0]),
            "startFreq": 100.0,
            "freqStep": 10.0,
            "smoothing": "1/48",
        });
        let curve = DecodedCurve::from_json(&body).unwrap();
        assert_eq!(curve.amplitudes, vec![70.0, 71.5, 72.0]);
        assert_eq!(curve.frequencies, vec![100.0, 110.0, 120.0]);
        assert_eq!(curve.smoothing.as_deref(), Some("1/48"));

        let points: Vec<(f64, f32)> = curve.points().unwrap().collect();
        assert_eq!(points[1], (110.0, 71.5));
    }

    #[test]
    fn test_missing_axis_parameters_keep_amplitudes() {
        let body = json!({ "magnitude": encode_base64(&[1.0, 2.0]) });
        let curve = DecodedCurve::from_json(&body).unwrap();
        assert_eq!(curve.len(), 2);
        assert!(!curve.has_axis());
        assert!(curve.points().is_none());
    }

    #[test]
    fn test_invalid_axis_degrades_to_empty_axis() {
        let body = json!({
            "magnitude": encode_base64(&[1.0, 2.0]),
            "startFreq": 20.0,
            "ppo": -3.0,
        });
        let curve = DecodedCurve::from_json(&body).unwrap();
        assert_eq!(curve.amplitudes, vec![1.0, 2.0]);
        assert!(curve.frequencies.is_empty());
    }

    #[test]
    fn test_malformed_magnitude_fails_curve() {
        // 3 bytes once decoded
        let body = json!({ "magnitude": "AAAA", "startFreq": 20.0, "ppo": 48.0 });
        assert!(matches!(
            DecodedCurve::from_json(&body),
            Err(IngestError::MalformedPayload(_))
        ));

        let body = json!({ "startFreq": 20.0 });
        assert!(matches!(
            DecodedCurve::from_json(&body),
            Err(IngestError::MalformedPayload(_))
        ));
    }
}
