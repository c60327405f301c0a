// tuner-core/src/lib.rs

//! The core logic for the string tuner.
//! This crate estimates the pitch of a plucked string from successive
//! audio frames and matches it to the nearest reference tuning. It is
//! completely headless; live capture is behind the `capture` feature.
//!
//! ```no_run
//! use std::time::Duration;
//! use tuner_core::{DetectorConfig, PitchDetector};
//!
//! let mut detector = PitchDetector::new(44100, DetectorConfig::default())?;
//! let frame = vec![0.0_f32; 2048];
//! if let Some(reading) = detector.process(Duration::ZERO, &frame)? {
//!     println!("{} Hz near {}", reading.frequency, reading.reference);
//! }
//! # Ok::<(), tuner_core::TunerError>(())
//! ```

#[cfg(feature = "capture")]
pub mod audio;
pub mod config;
pub mod detector;
pub mod error;
pub mod framing;
pub mod note;
pub mod presets;
pub mod reference;
pub mod refiner;
pub mod scorer;
pub mod sink;
pub mod window;

pub use config::DetectorConfig;
pub use detector::{DetectorState, PitchDetector, PitchReading, TrackingPhase};
pub use error::{TunerError, TunerResult};
pub use note::NoteEstimate;
pub use reference::{ReferenceSpec, ReferenceTuning};
pub use sink::PitchSink;
