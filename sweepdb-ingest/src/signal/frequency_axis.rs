//! Frequency axis reconstruction
//!
//! The measurement application sends only `startFreq` plus either a linear
//! `freqStep` or a log density `ppo` (points per octave):
//! - linear: `f[i] = start + i * step`
//! - log:    `f[i] = start * r^i`, `r = exp(ln 2 / ppo)`
//!
//! Missing parameters are not an error: the axis is simply empty and the
//! curve proceeds without one. When both `freqStep` and `ppo` are present,
//! `freqStep` wins.

use crate::error::{IngestError, IngestResult};
use serde::{Deserialize, Serialize};

/// Sampling scheme of a reconstructed axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AxisSpacing {
    Linear { step: f64 },
    Log { ppo: f64 },
}

impl AxisSpacing {
    /// Ratio between consecutive log-spaced points
    pub fn log_ratio(ppo: f64) -> f64 {
        (std::f64::consts::LN_2 / ppo).exp()
    }
}

/// Sparse axis parameters as carried by the upstream response and by
/// exported documents
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisParameters {
    #[serde(default)]
    pub start_freq: Option<f64>,
    #[serde(default)]
    pub freq_step: Option<f64>,
    #[serde(default)]
    pub ppo: Option<f64>,
}

impl AxisParameters {
    pub fn linear(start_freq: f64, freq_step: f64) -> Self {
        Self {
            start_freq: Some(start_freq),
            freq_step: Some(freq_step),
            ppo: None,
        }
    }

    pub fn log(start_freq: f64, ppo: f64) -> Self {
        Self {
            start_freq: Some(start_freq),
            freq_step: None,
            ppo: Some(ppo),
        }
    }

    /// Effective spacing (`freqStep` preferred over `ppo`)
    pub fn spacing(&self) -> Option<AxisSpacing> {
        match (self.freq_step, self.ppo) {
            (Some(step), _) => Some(AxisSpacing::Linear { step }),
            (None, Some(ppo)) => Some(AxisSpacing::Log { ppo }),
            (None, None) => None,
        }
    }

    /// Build `n` frequencies, in sample order
    ///
    /// Returns an empty axis when `startFreq` is absent, `n == 0`, or no
    /// spacing parameter is present. Fails with `InvalidAxisParameters` only
    /// for values that cannot describe an axis (non-finite values, `ppo <= 0`,
    /// or a non-positive start frequency on a log axis).
    pub fn build(&self, n: usize) -> IngestResult<Vec<f64>> {
        let (start, spacing) = match (self.start_freq, self.spacing()) {
            (Some(start), Some(spacing)) if n > 0 => (start, spacing),
            _ => return Ok(Vec::new()),
        };

        if !start.is_finite() {
            return Err(IngestError::InvalidAxisParameters(format!(
                "startFreq must be finite, got {}",
                start
            )));
        }

        match spacing {
            AxisSpacing::Linear { step } => {
                if !step.is_finite() {
                    return Err(IngestError::InvalidAxisParameters(format!(
                        "freqStep must be finite, got {}",
                        step
                    )));
                }
                Ok((0..n).map(|i| start + i as f64 * step).collect())
            }
            AxisSpacing::Log { ppo } => {
                if !ppo.is_finite() || ppo <= 0.0 {
                    return Err(IngestError::InvalidAxisParameters(format!(
                        "ppo must be a positive finite number, got {}",
                        ppo
                    )));
                }
                if start <= 0.0 {
                    return Err(IngestError::InvalidAxisParameters(format!(
                        "log axis needs a positive startFreq, got {}",
                        start
                    )));
                }
                let ratio = AxisSpacing::log_ratio(ppo);
                Ok((0..n).map(|i| start * ratio.powf(i as f64)).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() <= 1e-9 * e.abs().max(1.0), "{} != {}", a, e);
        }
    }

    #[test]
    fn test_linear_axis() {
        let axis = AxisParameters::linear(100.0, 10.0).build(5).unwrap();
        assert_eq!(axis, vec![100.0, 110.0, 120.0, 130.0, 140.0]);
    }

    #[test]
    fn test_log_axis_one_point_per_octave() {
        let axis = AxisParameters::log(20.0, 1.0).build(3).unwrap();
        assert_close(&axis, &[20.0, 40.0, 80.0]);
    }

    #[test]
    fn test_log_axis_doubles_every_ppo_points() {
        let axis = AxisParameters::log(20.0, 48.0).build(97).unwrap();
        assert_close(&[axis[48], axis[96]], &[40.0, 80.0]);
        assert!(axis.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_missing_parameters_give_empty_axis() {
        let no_start = AxisParameters {
            start_freq: None,
            freq_step: Some(1.0),
            ppo: None,
        };
        assert!(no_start.build(10).unwrap().is_empty());

        assert!(AxisParameters::linear(100.0, 10.0).build(0).unwrap().is_empty());

        let no_spacing = AxisParameters {
            start_freq: Some(20.0),
            ..Default::default()
        };
        assert!(no_spacing.build(10).unwrap().is_empty());
    }

    #[test]
    fn test_freq_step_preferred_over_ppo() {
        let both = AxisParameters {
            start_freq: Some(10.0),
            freq_step: Some(5.0),
            ppo: Some(24.0),
        };
        assert_eq!(both.spacing(), Some(AxisSpacing::Linear { step: 5.0 }));
        assert_eq!(both.build(3).unwrap(), vec![10.0, 15.0, 20.0]);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(matches!(
            AxisParameters::log(20.0, 0.0).build(4),
            Err(IngestError::InvalidAxisParameters(_))
        ));
        assert!(matches!(
            AxisParameters::log(0.0, 24.0).build(4),
            Err(IngestError::InvalidAxisParameters(_))
        ));
        assert!(matches!(
            AxisParameters::linear(f64::NAN, 1.0).build(4),
            Err(IngestError::InvalidAxisParameters(_))
        ));
        assert!(matches!(
            AxisParameters::linear(1.0, f64::INFINITY).build(4),
            Err(IngestError::InvalidAxisParameters(_))
        ));
    }

    #[test]
    fn test_deserialize_upstream_field_names() {
        let params: AxisParameters =
            serde_json::from_str(r#"{"startFreq": 2.1972656, "freqStep": 0.36621097}"#).unwrap();
        assert_eq!(params, AxisParameters::linear(2.1972656, 0.36621097));
    }
}
