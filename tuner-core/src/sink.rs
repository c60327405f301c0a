//! Output hooks for detector readings.

use crate::detector::PitchReading;
use crate::note::NoteEstimate;

/// Receives each detection result, e.g. a display or a log.
pub trait PitchSink {
    /// Called for every frame that produced a pitch.
    fn on_pitch_detected(&mut self, frequency: f32, octave: i32, note: u8);

    /// Called with the full reading; the default derives the note and
    /// forwards to [`on_pitch_detected`](Self::on_pitch_detected).
    fn on_reading(&mut self, reading: &PitchReading) {
        if let Some(note) = NoteEstimate::from_frequency(reading.frequency) {
            self.on_pitch_detected(reading.frequency, note.octave, note.pitch_class);
        }
    }

    /// Called for frames below the signal threshold.
    fn on_silence(&mut self) {}
}

/// Sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl PitchSink for NullSink {
    fn on_pitch_detected(&mut self, _frequency: f32, _octave: i32, _note: u8) {}
}

/// Routes one detector result to `sink`.
pub fn dispatch<S: PitchSink + ?Sized>(sink: &mut S, reading: Option<&PitchReading>) {
    match reading {
        Some(reading) => sink.on_reading(reading),
        None => sink.on_silence(),
    }
}
