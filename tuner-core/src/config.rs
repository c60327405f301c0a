//! Detector configuration parameters

use crate::error::{TunerError, TunerResult};
use crate::presets::{self, Preset};
use crate::reference::{ReferenceSpec, ReferenceTable};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Longest accepted frame, about 24 s at 44.1 kHz.
pub const MAX_BUFFER_LENGTH: usize = 1 << 20;

/// Pitch detector configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Reference tunings to match against (default: standard guitar)
    pub references: Vec<ReferenceSpec>,

    /// Samples per analysis frame (default: 2048)
    /// Scoring compares the first half of the frame with a shifted copy.
    pub buffer_length: usize,

    /// Frames with RMS strictly below this are ignored (default: 0.008)
    pub rms_minimum_threshold: f32,

    /// RMS rise over the previous frame that counts as an onset (default: 0.006)
    pub rms_rise_threshold: f32,

    /// How long references are scored after an onset, in ms (default: 250)
    pub assessment_window_ms: u64,

    /// Refinement sweeps this many samples either side of the seed (default: 10)
    pub refinement_radius: usize,

    /// Refinement stops at the first difference below this (default: 0.001)
    pub refinement_tolerance: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            references: presets::standard_guitar(),
            buffer_length: 2048,
            rms_minimum_threshold: 0.008,
            rms_rise_threshold: 0.006,
            assessment_window_ms: 250,
            refinement_radius: 10,
            refinement_tolerance: 0.001,
        }
    }
}

impl DetectorConfig {
    /// Default thresholds with the references and frame length of `preset`.
    pub fn from_preset(preset: &Preset) -> Self {
        Self {
            references: preset.references.clone(),
            buffer_length: preset.buffer_length,
            ..Self::default()
        }
    }

    pub fn assessment_window(&self) -> Duration {
        Duration::from_millis(self.assessment_window_ms)
    }

    /// Number of leading samples compared per self-difference.
    pub fn search_length(&self) -> usize {
        self.buffer_length / 2
    }

    /// Resolves the references against `sample_rate` and checks that every
    /// scoring and refinement window fits inside one frame.
    ///
    /// # Errors
    /// * `InvalidSampleRate` - zero rate
    /// * `InvalidBufferLength` - a frame too short to search or above `MAX_BUFFER_LENGTH`
    /// * any reference table error
    /// * `OffsetBelowSearchRadius` - refinement would scan a period below 1
    /// * `OffsetExceedsBuffer` - refinement would read past the frame
    pub fn build_table(&self, sample_rate: u32) -> TunerResult<ReferenceTable> {
        if sample_rate == 0 {
            return Err(TunerError::InvalidSampleRate(sample_rate));
        }
        if self.search_length() == 0 || self.buffer_length > MAX_BUFFER_LENGTH {
            return Err(TunerError::InvalidBufferLength(self.buffer_length));
        }

        let table = ReferenceTable::new(&self.references, sample_rate)?;
        let radius = self.refinement_radius;
        let search_length = self.search_length();

        for reference in table.entries() {
            let offset = reference.expected_offset();
            if offset <= radius {
                return Err(TunerError::OffsetBelowSearchRadius {
                    name: reference.name().to_string(),
                    offset,
                    radius,
                });
            }
            // The widest read is index (search_length - 1) + (offset + radius - 1),
            // or (search_length - 1) + offset when there is no sweep.
            let last_read = offset
                .checked_add(radius.max(1))
                .and_then(|end| end.checked_add(search_length))
                .map(|end| end - 2);
            if last_read.is_none_or(|index| index >= self.buffer_length) {
                return Err(TunerError::OffsetExceedsBuffer {
                    name: reference.name().to_string(),
                    offset,
                    radius,
                    search_length,
                    buffer_length: self.buffer_length,
                });
            }
        }
        Ok(table)
    }
}
