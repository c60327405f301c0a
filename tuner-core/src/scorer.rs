//! # Candidate Scorer
//!
//! Scores every reference against the live frame by comparing the frame
//! with itself shifted by the reference's expected period. A signal that
//! really repeats every `p` samples cancels out and scores near zero.

use crate::error::{TunerError, TunerResult};
use crate::reference::ReferenceTable;

/// Mean absolute difference between `buffer[i]` and `buffer[i + offset]`
/// for `i` in `0..search_length`.
///
/// Out-of-range windows are rejected rather than padded: the detector
/// validates every period against its frame length up front, so this only
/// fails for direct callers.
///
/// # Errors
/// * `EmptyBuffer` - `search_length` is zero
/// * `WindowOutOfRange` - `offset + search_length` exceeds the buffer
pub fn self_difference(buffer: &[f32], offset: usize, search_length: usize) -> TunerResult<f32> {
    if search_length == 0 {
        return Err(TunerError::EmptyBuffer);
    }
    let shifted = offset
        .checked_add(search_length)
        .and_then(|end| buffer.get(offset..end))
        .ok_or(TunerError::WindowOutOfRange {
            offset,
            search_length,
            buffer_length: buffer.len(),
        })?;

    let total: f32 = buffer[..search_length]
        .iter()
        .zip(shifted)
        .map(|(a, b)| (a - b).abs())
        .sum();
    Ok(total / search_length as f32)
}

/// Adds this frame's period-weighted difference to every reference.
///
/// When `reset` is set (first frame of a new assessment window) each score
/// is zeroed before accumulating. Weighting by period makes low references
/// pay more for the same mismatch, which keeps harmonic bleed from pulling
/// the match down an octave.
pub fn score_references(
    buffer: &[f32],
    search_length: usize,
    table: &mut ReferenceTable,
    reset: bool,
) -> TunerResult<()> {
    for reference in table.entries_mut() {
        if reset {
            reference.accumulated_difference = 0.0;
        }
        let offset = reference.expected_offset();
        let difference = self_difference(buffer, offset, search_length)?;
        reference.accumulated_difference += difference * offset as f32;
    }
    Ok(())
}
