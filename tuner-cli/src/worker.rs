//! Live analysis loop: capture frames in, readings out.

use anyhow::Result;
use cpal::traits::StreamTrait;
use crossbeam_channel::{Receiver, select};
use std::time::Duration;
use tuner_core::audio::{self, CapturedFrame};
use tuner_core::sink::{PitchSink, dispatch};
use tuner_core::{DetectorConfig, PitchDetector};

/// Frames buffered between the device callback and the analysis loop.
const FRAME_QUEUE: usize = 8;

/// Captures from the default input and feeds `sink` until `seconds`
/// elapse (or forever) or the stream closes.
pub fn listen(
    config: DetectorConfig,
    hop_length: usize,
    seconds: Option<u64>,
    sink: &mut dyn PitchSink,
) -> Result<()> {
    let (frame_tx, frame_rx) = crossbeam_channel::bounded::<CapturedFrame>(FRAME_QUEUE);

    tracing::info!("[CLI] Starting audio capture...");
    let (stream, sample_rate) =
        audio::start_audio_capture(frame_tx, config.buffer_length, hop_length)?;
    let mut detector = PitchDetector::new(sample_rate, config)?;

    let stop = match seconds {
        Some(seconds) => crossbeam_channel::after(Duration::from_secs(seconds)),
        None => crossbeam_channel::never(),
    };

    tracing::info!("[CLI] Listening, pluck a string...");
    let outcome = analysis_loop(&mut detector, &frame_rx, &stop, sink);

    tracing::info!("[CLI] Stopping stream...");
    if let Err(e) = stream.pause() {
        tracing::warn!("[CLI] Error pausing stream: {}", e);
    }
    drop(stream);
    outcome
}

fn analysis_loop(
    detector: &mut PitchDetector,
    frames: &Receiver<CapturedFrame>,
    stop: &Receiver<std::time::Instant>,
    sink: &mut dyn PitchSink,
) -> Result<()> {
    loop {
        select! {
            recv(frames) -> msg => match msg {
                Ok(frame) => {
                    let reading = detector.process(frame.timestamp, &frame.samples)?;
                    dispatch(&mut *sink, reading.as_ref());
                }
                Err(_) => {
                    tracing::info!("[CLI] Audio channel closed");
                    return Ok(());
                }
            },
            recv(stop) -> _ => {
                tracing::info!("[CLI] Listening time elapsed");
                return Ok(());
            },
        }
    }
}
