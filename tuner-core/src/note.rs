//! # Note Naming
//!
//! Maps a detected frequency onto equal-tempered note names (A4 = 440 Hz)
//! and measures deviation in cents.

use serde::Serialize;

/// Pitch-class names, indexed from A.
pub const NOTE_NAMES: [&str; 12] = [
    "A", "A#", "B", "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#",
];

const A4_FREQUENCY: f32 = 440.0;

/// Nearest equal-tempered note to a frequency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NoteEstimate {
    /// Scientific octave number (C4 is middle C)
    pub octave: i32,
    /// Pitch class, 0 = A through 11 = G#
    pub pitch_class: u8,
    /// Deviation from the nearest note in cents, in [-50, 50]
    pub cents: f32,
}

impl NoteEstimate {
    /// Returns `None` for non-positive or non-finite frequencies.
    pub fn from_frequency(frequency: f32) -> Option<Self> {
        if !frequency.is_finite() || frequency <= 0.0 {
            return None;
        }
        let semitones_from_a4 = 12.0 * (frequency / A4_FREQUENCY).log2();
        let nearest = semitones_from_a4.round();
        let semitone = nearest as i32;
        // Octaves roll over at C, nine semitones below A4. Taken from the
        // rounded semitone so a slightly flat C4 is not labelled C3.
        let octave = (semitone + 4 * 12 + 9).div_euclid(12);
        let pitch_class = semitone.rem_euclid(12) as u8;
        Some(Self {
            octave,
            pitch_class,
            cents: 100.0 * (semitones_from_a4 - nearest),
        })
    }

    pub fn name(&self) -> &'static str {
        NOTE_NAMES[self.pitch_class as usize]
    }

    /// Name with octave, e.g. "C#3".
    pub fn label(&self) -> String {
        format!("{}{}", self.name(), self.octave)
    }
}

/// Calculates the deviation of `frequency` from `target_frequency` in cents.
///
/// Positive is sharp, negative is flat; 100 cents is one semitone.
pub fn cents_deviation(frequency: f32, target_frequency: f32) -> f32 {
    1200.0 * (frequency / target_frequency).log2()
}
