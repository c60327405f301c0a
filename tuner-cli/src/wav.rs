//! Offline analysis of WAV recordings.

use anyhow::{Context, Result, bail};
use hound::{SampleFormat, WavReader};
use std::io::Read;
use std::path::Path;
use tuner_core::framing::FrameAssembler;
use tuner_core::sink::{PitchSink, dispatch};
use tuner_core::{DetectorConfig, PitchDetector, TunerError};

/// Samples fed to the assembler per call, roughly one audio callback.
const CHUNK: usize = 512;

/// Totals for one analysed recording.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Summary {
    pub frames: usize,
    pub pitched: usize,
    pub last_reference: Option<String>,
}

/// Decodes the first channel of a WAV file to f32 in [-1, 1].
pub fn read_mono<R: Read>(reader: WavReader<R>) -> Result<(Vec<f32>, u32)> {
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;
    let samples = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .step_by(channels)
            .collect::<Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                bail!("Unsupported bit depth {}", spec.bits_per_sample);
            }
            let scale = (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .step_by(channels)
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<Vec<_>, _>>()?
        }
    };
    Ok((samples, spec.sample_rate))
}

/// Runs the detector over `samples` as if they arrived live.
pub fn analyze_samples(
    samples: &[f32],
    sample_rate: u32,
    config: DetectorConfig,
    hop_length: usize,
    sink: &mut dyn PitchSink,
) -> Result<Summary> {
    let mut assembler = FrameAssembler::new(config.buffer_length, hop_length, sample_rate)?;
    let mut detector = PitchDetector::new(sample_rate, config)?;
    let mut summary = Summary::default();
    let mut failure: Option<TunerError> = None;

    for chunk in samples.chunks(CHUNK) {
        assembler.push(chunk, |timestamp, frame| {
            if failure.is_some() {
                return;
            }
            match detector.process(timestamp, frame) {
                Ok(reading) => {
                    summary.frames += 1;
                    if let Some(reading) = &reading {
                        summary.pitched += 1;
                        summary.last_reference = Some(reading.reference.clone());
                    }
                    dispatch(&mut *sink, reading.as_ref());
                }
                Err(e) => failure = Some(e),
            }
        });
        if let Some(e) = failure.take() {
            return Err(e.into());
        }
    }

    tracing::info!(
        "[CLI] Analysed {} frames, {} with pitch",
        summary.frames,
        summary.pitched
    );
    Ok(summary)
}

/// Opens `path` and analyses it.
pub fn analyze_file(
    path: &Path,
    config: DetectorConfig,
    hop_length: usize,
    sink: &mut dyn PitchSink,
) -> Result<Summary> {
    let reader = WavReader::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let (samples, sample_rate) = read_mono(reader)?;
    tracing::info!(
        "[CLI] {}: {} samples at {} Hz",
        path.display(),
        samples.len(),
        sample_rate
    );
    analyze_samples(&samples, sample_rate, config, hop_length, sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{WavSpec, WavWriter};
    use std::io::Cursor;
    use tuner_core::sink::NullSink;

    fn pluck(frequency: f32, seconds: f32, sample_rate: u32) -> Vec<f32> {
        let len = (seconds * sample_rate as f32) as usize;
        (0..len)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                0.6 * (2.0 * std::f32::consts::PI * frequency * t).sin()
            })
            .collect()
    }

    #[test]
    fn decodes_stereo_int_wav() {
        let spec = WavSpec {
            channels: 2,
            sample_rate: 44100,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
            for value in [16384_i16, -1, -16384, -1] {
                writer.write_sample(value).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.set_position(0);
        let (samples, rate) = read_mono(WavReader::new(cursor).unwrap()).unwrap();
        assert_eq!(rate, 44100);
        assert_eq!(samples, vec![0.5, -0.5]);
    }

    #[test]
    fn open_string_is_recognised() {
        let samples = pluck(146.832, 1.0, 44100);
        let config = DetectorConfig::default();
        let summary = analyze_samples(&samples, 44100, config, 1024, &mut NullSink).unwrap();
        assert!(summary.frames > 30);
        assert_eq!(summary.pitched, summary.frames);
        assert_eq!(summary.last_reference.as_deref(), Some("d3"));
    }

    #[test]
    fn invalid_hop_is_reported() {
        let samples = pluck(110.0, 0.1, 44100);
        let config = DetectorConfig::default();
        assert!(analyze_samples(&samples, 44100, config, 0, &mut NullSink).is_err());
    }
}
