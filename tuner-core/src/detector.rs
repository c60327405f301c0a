//! # Pitch Detector
//!
//! Drives one detection step per incoming frame:
//!
//! 1. RMS gate: quiet frames report no pitch and leave all state untouched
//! 2. Onset check: an RMS rise opens (or extends) the assessment window
//! 3. Inside the window every reference is scored; outside it scores freeze
//! 4. When the window closes the references are re-ranked, once
//! 5. The leader's period seeds a local refinement sweep
//!
//! ## States
//! - **Idle**: RMS below the minimum, `detect` returns `None`
//! - **Assessing**: within the window after an onset, ranking held while scores move
//! - **Holding**: between onsets, ranking and scores frozen

use crate::config::DetectorConfig;
use crate::error::{TunerError, TunerResult};
use crate::note::cents_deviation;
use crate::reference::{ReferenceTable, ReferenceTuning};
use crate::refiner::refine_period;
use crate::scorer::score_references;
use crate::window::compute_rms;
use serde::Serialize;
use std::time::Duration;

/// Which part of the tracking cycle produced a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackingPhase {
    Assessing,
    Holding,
}

/// Result of a frame that carried enough signal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PitchReading {
    /// Detected frequency in Hz
    pub frequency: f32,
    /// Name of the best-matching reference
    pub reference: String,
    /// Target frequency of that reference
    pub target_frequency: f32,
    /// Refined period in samples
    pub period: usize,
    /// Self-difference at `period`
    pub difference: f32,
    /// Deviation from the reference target in cents
    pub cents: f32,
    pub phase: TrackingPhase,
}

/// Per-frame bookkeeping carried between detection steps.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DetectorState {
    /// RMS of the last frame that passed the gate
    pub last_rms: f32,
    /// Scoring continues while frame timestamps are before this
    pub assessment_deadline: Duration,
    /// The previous gated frame was scored
    pub was_assessing: bool,
}

/// Frame-driven pitch detector over a fixed reference set.
#[derive(Debug, Clone)]
pub struct PitchDetector {
    sample_rate: u32,
    config: DetectorConfig,
    search_length: usize,
    assessment_window: Duration,
    references: ReferenceTable,
    state: DetectorState,
    frame: Vec<f32>,
}

impl PitchDetector {
    /// Creates a detector for a stream at `sample_rate`.
    ///
    /// All references are resolved to periods here; any configuration that
    /// would let scoring or refinement run off the end of a frame is
    /// rejected now rather than mid-scan.
    pub fn new(sample_rate: u32, config: DetectorConfig) -> TunerResult<Self> {
        let references = config.build_table(sample_rate)?;
        tracing::debug!(
            sample_rate,
            buffer_length = config.buffer_length,
            references = references.len(),
            "pitch detector ready"
        );
        Ok(Self {
            sample_rate,
            search_length: config.search_length(),
            assessment_window: config.assessment_window(),
            frame: vec![0.0; config.buffer_length],
            references,
            state: DetectorState::default(),
            config,
        })
    }

    pub fn state(&self) -> &DetectorState {
        &self.state
    }

    pub fn references(&self) -> &ReferenceTable {
        &self.references
    }

    /// References in current rank order, best first.
    pub fn ranking(&self) -> impl Iterator<Item = &ReferenceTuning> + '_ {
        self.references.ranked()
    }

    pub fn best(&self) -> &ReferenceTuning {
        self.references.best()
    }

    pub fn frame(&self) -> &[f32] {
        &self.frame
    }

    /// The frame buffer to fill in place before calling [`detect`](Self::detect).
    pub fn frame_mut(&mut self) -> &mut [f32] {
        &mut self.frame
    }

    /// Copies `samples` into the frame buffer and runs one detection step.
    ///
    /// # Errors
    /// * `FrameLengthMismatch` - `samples` is not exactly one frame long
    pub fn process(
        &mut self,
        timestamp: Duration,
        samples: &[f32],
    ) -> TunerResult<Option<PitchReading>> {
        if samples.len() != self.frame.len() {
            return Err(TunerError::FrameLengthMismatch {
                expected: self.frame.len(),
                actual: samples.len(),
            });
        }
        self.frame.copy_from_slice(samples);
        self.detect(timestamp)
    }

    /// Runs one detection step over the current frame buffer.
    ///
    /// `timestamp` must come from a monotonic clock shared by all frames.
    /// Returns `Ok(None)` when the frame is too quiet.
    pub fn detect(&mut self, timestamp: Duration) -> TunerResult<Option<PitchReading>> {
        let rms = compute_rms(&self.frame)?;
        if rms < self.config.rms_minimum_threshold {
            return Ok(None);
        }

        if rms > self.state.last_rms + self.config.rms_rise_threshold {
            self.state.assessment_deadline = timestamp + self.assessment_window;
            tracing::debug!(
                rms,
                last_rms = self.state.last_rms,
                until = ?self.state.assessment_deadline,
                "onset, assessing references"
            );
        }

        let was_assessing = self.state.was_assessing;
        let assessing = timestamp < self.state.assessment_deadline;
        if assessing {
            score_references(
                &self.frame,
                self.search_length,
                &mut self.references,
                !was_assessing,
            )?;
        }
        self.state.was_assessing = assessing;

        if was_assessing && !assessing {
            self.references.sort_by_difference();
            let leader = self.references.best();
            tracing::debug!(
                reference = leader.name(),
                difference = leader.accumulated_difference,
                "assessment window closed"
            );
        }

        let best = self.references.best();
        let refinement = refine_period(
            &self.frame,
            best.expected_offset(),
            self.config.refinement_radius,
            self.search_length,
            self.config.refinement_tolerance,
        )?;

        self.state.last_rms = rms;

        let frequency = self.sample_rate as f32 / refinement.period as f32;
        Ok(Some(PitchReading {
            frequency,
            reference: best.name().to_string(),
            target_frequency: best.target_frequency(),
            period: refinement.period,
            difference: refinement.difference,
            cents: cents_deviation(frequency, best.target_frequency()),
            phase: if assessing {
                TrackingPhase::Assessing
            } else {
                TrackingPhase::Holding
            },
        }))
    }

    /// Returns to the freshly constructed state: scores zeroed, configuration
    /// order restored, no window open.
    pub fn reset(&mut self) {
        self.references.reset();
        self.state = DetectorState::default();
        self.frame.fill(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::ReferenceSpec;
    use std::f32::consts::PI;

    const SAMPLE_RATE: u32 = 44100;

    fn sine(frequency: f32, amplitude: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| amplitude * (2.0 * PI * frequency * i as f32 / SAMPLE_RATE as f32).sin())
            .collect()
    }

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn silence_reports_no_pitch_and_keeps_state() {
        let mut detector =
            PitchDetector::new(SAMPLE_RATE, DetectorConfig::default()).unwrap();
        assert_eq!(detector.process(ms(0), &[0.0; 2048]).unwrap(), None);
        assert_eq!(*detector.state(), DetectorState::default());
        for reference in detector.references().entries() {
            assert_eq!(reference.accumulated_difference, 0.0);
        }
    }

    #[test]
    fn wrong_frame_length_is_rejected() {
        let mut detector =
            PitchDetector::new(SAMPLE_RATE, DetectorConfig::default()).unwrap();
        assert_eq!(
            detector.process(ms(0), &[0.1; 100]),
            Err(TunerError::FrameLengthMismatch {
                expected: 2048,
                actual: 100,
            })
        );
    }

    #[test]
    fn single_reference_sine_is_within_one_percent() {
        let config = DetectorConfig {
            references: vec![ReferenceSpec::new("a2", 110.0)],
            ..DetectorConfig::default()
        };
        let mut detector = PitchDetector::new(SAMPLE_RATE, config).unwrap();
        let reading = detector
            .process(ms(0), &sine(110.0, 0.5, 2048))
            .unwrap()
            .unwrap();

        assert_eq!(reading.reference, "a2");
        assert!(reading.period.abs_diff(401) <= 10);
        assert!((reading.frequency - 110.0).abs() / 110.0 < 0.01);
        assert!(reading.cents.abs() < 17.0);
        assert_eq!(reading.phase, TrackingPhase::Assessing);
    }

    #[test]
    fn onset_opens_window_and_scores_reset_on_reopen() {
        let config = DetectorConfig {
            references: vec![
                ReferenceSpec::new("a2", 110.0),
                ReferenceSpec::new("e4", 329.628),
            ],
            ..DetectorConfig::default()
        };
        let mut detector = PitchDetector::new(SAMPLE_RATE, config).unwrap();
        let frame = sine(110.0, 0.5, 2048);

        detector.process(ms(1000), &frame).unwrap();
        assert_eq!(detector.state().assessment_deadline, ms(1250));
        assert!(detector.state().was_assessing);
        let first = detector.references().entries()[1].accumulated_difference;

        detector.process(ms(1100), &frame).unwrap();
        let second = detector.references().entries()[1].accumulated_difference;
        assert!(second > first);

        let reading = detector.process(ms(1300), &frame).unwrap().unwrap();
        assert_eq!(reading.phase, TrackingPhase::Holding);
        assert!(!detector.state().was_assessing);
        assert_eq!(
            detector.references().entries()[1].accumulated_difference,
            second
        );

        // A louder frame is a new onset: the window reopens and scores restart.
        detector.process(ms(2000), &sine(110.0, 0.9, 2048)).unwrap();
        assert_eq!(detector.state().assessment_deadline, ms(2250));
        let restarted = detector.references().entries()[1].accumulated_difference;
        assert!(restarted < second);
    }

    #[test]
    fn in_place_frames_hold_ranking_until_window_closes() {
        let mut detector =
            PitchDetector::new(SAMPLE_RATE, DetectorConfig::default()).unwrap();
        let pluck = sine(110.0, 0.5, 2048);

        // Ranking starts in configuration order, so the first frames still refine around e2.
        detector.frame_mut().copy_from_slice(&pluck);
        let first = detector.detect(ms(0)).unwrap().unwrap();
        assert_eq!(first.phase, TrackingPhase::Assessing);
        assert_eq!(first.reference, "e2");
        assert!(first.period.abs_diff(535) <= 10);

        // The buffer is reused untouched between frames.
        let second = detector.detect(ms(100)).unwrap().unwrap();
        assert_eq!(second.reference, "e2");
        assert_eq!(detector.best().name(), "e2");

        // A quiet frame neither reads nor changes anything.
        let state = *detector.state();
        detector.frame_mut().fill(0.0005);
        assert_eq!(detector.detect(ms(200)).unwrap(), None);
        assert_eq!(*detector.state(), state);

        detector.frame_mut().copy_from_slice(&pluck);
        let held = detector.detect(ms(300)).unwrap().unwrap();
        assert_eq!(held.phase, TrackingPhase::Holding);
        assert_eq!(held.reference, "a2");
        assert!((held.frequency - 110.0).abs() / 110.0 < 0.01);
        assert_eq!(detector.frame(), &pluck[..]);
    }

    #[test]
    fn reset_restores_construction_state() {
        let mut detector =
            PitchDetector::new(SAMPLE_RATE, DetectorConfig::default()).unwrap();
        detector.process(ms(0), &sine(196.0, 0.5, 2048)).unwrap();
        detector.process(ms(500), &sine(196.0, 0.5, 2048)).unwrap();
        assert_ne!(*detector.state(), DetectorState::default());

        detector.reset();
        assert_eq!(*detector.state(), DetectorState::default());
        assert_eq!(detector.best().name(), "e2");
        assert!(detector.frame().iter().all(|&s| s == 0.0));
    }
}
