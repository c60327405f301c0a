//! # Window and Energy Utilities
//!
//! Stateless helpers shared by the detector: the RMS energy gate and a
//! Hamming window for callers that want to condition a buffer before
//! further analysis.

use crate::error::{TunerError, TunerResult};
use std::f32::consts::PI;

/// Computes the root-mean-square energy of a sample buffer.
///
/// For PCM in [-1, 1] this is the amount of signal in the buffer and is
/// what the detector gates on.
///
/// # Errors
/// * `TunerError::EmptyBuffer` - the buffer has no samples
pub fn compute_rms(buffer: &[f32]) -> TunerResult<f32> {
    if buffer.is_empty() {
        return Err(TunerError::EmptyBuffer);
    }
    let sum_of_squares: f32 = buffer.iter().map(|&s| s * s).sum();
    Ok((sum_of_squares / buffer.len() as f32).sqrt())
}

/// Generates a Hamming window of `size` coefficients.
///
/// Returns an empty vector for `size <= 1`. Endpoints are `0.08` and the
/// centre peaks at `1.0`.
pub fn hamming_window(size: usize) -> Vec<f32> {
    if size <= 1 {
        return Vec::new();
    }
    let n_minus_1 = (size - 1) as f32;
    (0..size)
        .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f32 / n_minus_1).cos())
        .collect()
}

/// Multiplies `buffer` in place by `window`, sample for sample.
///
/// # Errors
/// * `TunerError::FrameLengthMismatch` - lengths differ
pub fn apply_window(buffer: &mut [f32], window: &[f32]) -> TunerResult<()> {
    if buffer.len() != window.len() {
        return Err(TunerError::FrameLengthMismatch {
            expected: window.len(),
            actual: buffer.len(),
        });
    }
    for (sample, coefficient) in buffer.iter_mut().zip(window) {
        *sample *= coefficient;
    }
    Ok(())
}
