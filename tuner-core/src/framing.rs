//! # Frame Assembly
//!
//! Turns an arbitrarily chunked sample stream into fixed-length analysis
//! frames. A new frame is emitted every `hop_length` samples and always
//! holds the latest `frame_length` samples, so with a hop shorter than the
//! frame successive frames overlap.

use crate::error::{TunerError, TunerResult};
use std::collections::VecDeque;
use std::time::Duration;

/// Sliding-window frame builder with sample-clock timestamps.
#[derive(Debug, Clone)]
pub struct FrameAssembler {
    frame_length: usize,
    hop_length: usize,
    sample_rate: u32,
    history: VecDeque<f32>,
    since_last_frame: usize,
    samples_consumed: u64,
}

impl FrameAssembler {
    /// # Errors
    /// * `InvalidBufferLength` - `frame_length` is zero
    /// * `InvalidHopLength` - `hop_length` outside `1..=frame_length`
    /// * `InvalidSampleRate` - `sample_rate` is zero
    pub fn new(frame_length: usize, hop_length: usize, sample_rate: u32) -> TunerResult<Self> {
        if frame_length == 0 {
            return Err(TunerError::InvalidBufferLength(frame_length));
        }
        if hop_length == 0 || hop_length > frame_length {
            return Err(TunerError::InvalidHopLength {
                hop: hop_length,
                frame_length,
            });
        }
        if sample_rate == 0 {
            return Err(TunerError::InvalidSampleRate(sample_rate));
        }
        Ok(Self {
            frame_length,
            hop_length,
            sample_rate,
            history: VecDeque::with_capacity(frame_length),
            since_last_frame: 0,
            samples_consumed: 0,
        })
    }

    /// Stream time at the end of everything pushed so far.
    pub fn elapsed(&self) -> Duration {
        let nanos = self.samples_consumed as u128 * 1_000_000_000 / self.sample_rate as u128;
        Duration::from_nanos(nanos as u64)
    }

    /// Feeds `samples`, calling `on_frame(timestamp, frame)` for every
    /// frame completed along the way. The timestamp is the stream time of
    /// the frame's last sample.
    pub fn push<F>(&mut self, samples: &[f32], mut on_frame: F)
    where
        F: FnMut(Duration, &[f32]),
    {
        let mut scratch = Vec::new();
        for &sample in samples {
            if self.history.len() == self.frame_length {
                self.history.pop_front();
            }
            self.history.push_back(sample);
            self.samples_consumed += 1;
            self.since_last_frame += 1;

            if self.history.len() == self.frame_length && self.since_last_frame >= self.hop_length {
                self.since_last_frame = 0;
                scratch.clear();
                scratch.extend(self.history.iter().copied());
                on_frame(self.elapsed(), &scratch);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_arguments() {
        assert!(FrameAssembler::new(0, 1, 44100).is_err());
        assert!(FrameAssembler::new(8, 0, 44100).is_err());
        assert!(FrameAssembler::new(8, 9, 44100).is_err());
        assert!(FrameAssembler::new(8, 4, 0).is_err());
        assert!(FrameAssembler::new(8, 8, 44100).is_ok());
    }

    #[test]
    fn non_overlapping_frames() {
        let mut assembler = FrameAssembler::new(4, 4, 1000).unwrap();
        let input: Vec<f32> = (0..10).map(|i| i as f32).collect();
        let mut frames = Vec::new();
        // Chunk boundaries must not matter.
        for chunk in input.chunks(3) {
            assembler.push(chunk, |t, frame| frames.push((t, frame.to_vec())));
        }
        assert_eq!(
            frames,
            vec![
                (Duration::from_millis(4), vec![0.0, 1.0, 2.0, 3.0]),
                (Duration::from_millis(8), vec![4.0, 5.0, 6.0, 7.0]),
            ]
        );
        assert_eq!(assembler.elapsed(), Duration::from_millis(10));
    }

    #[test]
    fn overlapping_frames_hold_latest_samples() {
        let mut assembler = FrameAssembler::new(4, 2, 1000).unwrap();
        let input: Vec<f32> = (0..8).map(|i| i as f32).collect();
        let mut frames = Vec::new();
        assembler.push(&input, |_, frame| frames.push(frame.to_vec()));
        assert_eq!(
            frames,
            vec![
                vec![0.0, 1.0, 2.0, 3.0],
                vec![2.0, 3.0, 4.0, 5.0],
                vec![4.0, 5.0, 6.0, 7.0],
            ]
        );
    }
}
