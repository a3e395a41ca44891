//! Binary amplitude payload decoding
//!
//! The payload is a packed sequence of IEEE-754 single-precision values in
//! big-endian byte order, base64-encoded in transport. Values pass through
//! untouched: NaN payload bits and infinities survive a decode.

use crate::error::{IngestError, IngestResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

const SAMPLE_WIDTH: usize = 4;

/// Decode raw big-endian `f32` bytes
///
/// Fails with `MalformedPayload` when the length is not a multiple of 4.
pub fn decode_samples(bytes: &[u8]) -> IngestResult<Vec<f32>> {
    if bytes.len() % SAMPLE_WIDTH != 0 {
        return Err(IngestError::MalformedPayload(format!(
            "payload length {} is not a multiple of {}",
            bytes.len(),
            SAMPLE_WIDTH
        )));
    }

    Ok(bytes
        .chunks_exact(SAMPLE_WIDTH)
        .map(|chunk| f32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// Decode a base64 transport string into samples
pub fn decode_base64(encoded: &str) -> IngestResult<Vec<f32>> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| IngestError::MalformedPayload(format!("invalid base64: {}", e)))?;
    decode_samples(&bytes)
}

/// Pack samples as big-endian bytes
pub fn encode_samples(samples: &[f32]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_be_bytes()).collect()
}

/// Pack and base64-encode samples (inverse of [`decode_base64`])
pub fn encode_base64(samples: &[f32]) -> String {
    STANDARD.encode(encode_samples(samples))
}
