//! Curve reconstruction from the measurement application's wire format
//!
//! Amplitudes arrive as base64 big-endian `f32`; the frequency axis arrives
//! as sparse parameters and is rebuilt locally.

pub mod curve;
pub mod decoder;
pub mod frequency_axis;

pub use curve::{DecodedCurve, FrequencyResponse};
pub use decoder::{decode_base64, decode_samples, encode_base64, encode_samples};
pub use frequency_axis::{AxisParameters, AxisSpacing};
