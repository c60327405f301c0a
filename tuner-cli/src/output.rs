//! Console sinks for detector readings.

use serde::Serialize;
use std::io::Write;
use tuner_core::detector::{PitchReading, TrackingPhase};
use tuner_core::note::NoteEstimate;
use tuner_core::sink::PitchSink;

/// One printed line, e.g. `110.25 Hz  A2   +3.9c  a2  +3.9c  [holding]`.
pub fn format_reading(reading: &PitchReading) -> String {
    let (label, note_cents) = match NoteEstimate::from_frequency(reading.frequency) {
        Some(note) => (note.label(), note.cents),
        None => ("?".to_string(), 0.0),
    };
    let phase = match reading.phase {
        TrackingPhase::Assessing => "assessing",
        TrackingPhase::Holding => "holding",
    };
    format!(
        "{:8.2} Hz  {:<4} {:+6.1}c  {:<4} {:+7.1}c  [{}]",
        reading.frequency, label, note_cents, reading.reference, reading.cents, phase
    )
}

/// Human-readable sink writing one line per reading.
pub struct ConsoleSink<W: Write> {
    out: W,
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> PitchSink for ConsoleSink<W> {
    fn on_pitch_detected(&mut self, frequency: f32, octave: i32, note: u8) {
        let name = tuner_core::note::NOTE_NAMES[note as usize % 12];
        let _ = writeln!(self.out, "{frequency:8.2} Hz  {name}{octave}");
    }

    fn on_reading(&mut self, reading: &PitchReading) {
        let _ = writeln!(self.out, "{}", format_reading(reading));
    }
}

#[derive(Serialize)]
struct JsonLine<'a> {
    #[serde(flatten)]
    reading: &'a PitchReading,
    note: Option<String>,
    octave: Option<i32>,
}

/// Sink writing one JSON object per reading.
pub struct JsonSink<W: Write> {
    out: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> PitchSink for JsonSink<W> {
    fn on_pitch_detected(&mut self, frequency: f32, octave: i32, note: u8) {
        let _ = writeln!(
            self.out,
            "{}",
            serde_json::json!({ "frequency": frequency, "octave": octave, "pitch_class": note })
        );
    }

    fn on_reading(&mut self, reading: &PitchReading) {
        let note = NoteEstimate::from_frequency(reading.frequency);
        let line = JsonLine {
            reading,
            note: note.map(|n| n.name().to_string()),
            octave: note.map(|n| n.octave),
        };
        match serde_json::to_string(&line) {
            Ok(json) => {
                let _ = writeln!(self.out, "{json}");
            }
            Err(e) => tracing::warn!("[CLI] Could not serialise reading: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tuner_core::sink::dispatch;

    fn reading() -> PitchReading {
        PitchReading {
            frequency: 110.25,
            reference: "a2".into(),
            target_frequency: 110.0,
            period: 400,
            difference: 0.0005,
            cents: 3.93,
            phase: TrackingPhase::Holding,
        }
    }

    #[test]
    fn console_line() {
        let line = format_reading(&reading());
        assert!(line.contains("110.25 Hz"));
        assert!(line.contains("A2"));
        assert!(line.contains("a2"));
        assert!(line.ends_with("[holding]"));
    }

    #[test]
    fn console_sink_skips_silence() {
        let mut sink = ConsoleSink::new(Vec::new());
        dispatch(&mut sink, None);
        dispatch(&mut sink, Some(&reading()));
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn json_sink_flattens_reading() {
        let mut sink = JsonSink::new(Vec::new());
        dispatch(&mut sink, Some(&reading()));
        let text = String::from_utf8(sink.into_inner()).unwrap();
        let value: serde_json::Value = serde_json::from_str(text.trim()).unwrap();
        assert_eq!(value["reference"], "a2");
        assert_eq!(value["period"], 400);
        assert_eq!(value["phase"], "holding");
        assert_eq!(value["note"], "A");
        assert_eq!(value["octave"], 2);
    }
}
