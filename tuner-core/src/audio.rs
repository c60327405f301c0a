//! # Audio Capture
//!
//! Live input through CPAL. Device callbacks are cut into detector-sized
//! frames and handed to the analysis thread over a channel.
//!
//! ## Stream setup
//! - Default input device
//! - 32-bit float, mono preferred (otherwise the first channel is used)
//! - 44.1 kHz when the device supports it, else its highest rate

use crate::framing::FrameAssembler;
use anyhow::{Result, anyhow};
use cpal::SupportedStreamConfigRange;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::Sender;
use std::time::Duration;

/// Preferred capture rate in Hz.
pub const TARGET_SAMPLE_RATE: u32 = 44100;

/// One analysis frame stamped with stream time.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    pub samples: Vec<f32>,
    /// Stream time of the frame's last sample
    pub timestamp: Duration,
}

/// Starts capturing from the default input device.
///
/// Frames of `frame_length` samples are emitted every `hop_length` samples
/// and sent with `try_send`: if the receiver falls behind, frames are dropped
/// rather than queued.
///
/// # Returns
/// * `Ok((stream, sample_rate))` - running stream handle and its actual rate
/// * `Err(e)` - no device, no usable f32 format, or the stream failed to start
pub fn start_audio_capture(
    sender: Sender<CapturedFrame>,
    frame_length: usize,
    hop_length: usize,
) -> Result<(cpal::Stream, u32)> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| anyhow!("No input device available"))?;

    tracing::info!("[AUDIO] Using input device: {}", device.name()?);

    let configs = device.supported_input_configs()?.collect::<Vec<_>>();
    let supported_config = find_supported_config(configs, TARGET_SAMPLE_RATE)
        .ok_or_else(|| anyhow!("No suitable f32 input format found"))?;

    let sample_rate = pick_sample_rate(&supported_config, TARGET_SAMPLE_RATE);
    let config = supported_config.with_sample_rate(cpal::SampleRate(sample_rate));
    let channels = config.channels() as usize;
    let config: cpal::StreamConfig = config.into();

    tracing::info!(
        "[AUDIO] Capturing {} channel(s) at {} Hz",
        channels,
        sample_rate
    );

    let mut assembler = FrameAssembler::new(frame_length, hop_length, sample_rate)?;
    let mut mono = Vec::with_capacity(frame_length);
    let err_fn = |err: cpal::StreamError| tracing::error!("[AUDIO] Stream error: {}", err);

    let stream = device.build_input_stream(
        &config,
        move |data: &[f32], _: &cpal::InputCallbackInfo| {
            mono.clear();
            mono.extend(data.iter().step_by(channels.max(1)).copied());

            assembler.push(&mono, |timestamp, frame| {
                // Dropped when full; the analysis side only wants fresh frames.
                let _ = sender.try_send(CapturedFrame {
                    samples: frame.to_vec(),
                    timestamp,
                });
            });
        },
        err_fn,
        None,
    )?;

    stream.play()?;

    Ok((stream, sample_rate))
}

/// Picks the f32 input format closest to `target_rate`, mono first.
fn find_supported_config(
    configs: Vec<SupportedStreamConfigRange>,
    target_rate: u32,
) -> Option<SupportedStreamConfigRange> {
    configs
        .into_iter()
        .filter(|c| c.sample_format() == cpal::SampleFormat::F32)
        .min_by_key(|c| {
            let rates = c.min_sample_rate().0..=c.max_sample_rate().0;
            let rate_distance = if rates.contains(&target_rate) {
                0
            } else {
                let min_diff = c.min_sample_rate().0.abs_diff(target_rate);
                let max_diff = c.max_sample_rate().0.abs_diff(target_rate);
                min_diff.min(max_diff)
            };
            (c.channels() != 1, rate_distance)
        })
}

/// `target_rate` if the range allows it, otherwise the nearest bound.
fn pick_sample_rate(config: &SupportedStreamConfigRange, target_rate: u32) -> u32 {
    target_rate.clamp(config.min_sample_rate().0, config.max_sample_rate().0)
}
