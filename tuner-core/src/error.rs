//! Error types for the pitch-detection core.
//!
//! A frame with too little signal is not an error: the detector reports it
//! as `Ok(None)`. Everything here is either a rejected configuration or a
//! degenerate buffer handed across the boundary.

use thiserror::Error;

/// Result type for tuner operations
pub type TunerResult<T> = Result<T, TunerError>;

/// Errors raised by the detection core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TunerError {
    /// RMS (or any buffer metric) requested for a zero-length buffer
    #[error("Cannot analyse an empty sample buffer")]
    EmptyBuffer,

    /// Frame buffer length of zero, or too short to hold a search window
    #[error("Invalid buffer length: {0}")]
    InvalidBufferLength(usize),

    /// Sample rate of zero
    #[error("Invalid sample rate: {0} Hz")]
    InvalidSampleRate(u32),

    /// No reference tunings were supplied
    #[error("Reference set is empty")]
    EmptyReferenceSet,

    /// Two references share an identifier
    #[error("Duplicate reference '{0}'")]
    DuplicateReference(String),

    /// Target frequency is non-positive, non-finite or above the sample rate
    #[error("Reference '{name}' has invalid target frequency {frequency} Hz")]
    InvalidReferenceFrequency { name: String, frequency: f32 },

    /// Refinement would scan a period of zero or less
    #[error(
        "Reference '{name}' period of {offset} samples must exceed the refinement radius {radius}"
    )]
    OffsetBelowSearchRadius {
        name: String,
        offset: usize,
        radius: usize,
    },

    /// Scoring or refinement would read past the end of the frame
    #[error(
        "Reference '{name}' period of {offset} samples plus radius {radius} and search length {search_length} exceeds buffer length {buffer_length}"
    )]
    OffsetExceedsBuffer {
        name: String,
        offset: usize,
        radius: usize,
        search_length: usize,
        buffer_length: usize,
    },

    /// A self-difference window that does not fit inside the buffer
    #[error(
        "Search window of {search_length} samples at offset {offset} does not fit buffer of {buffer_length}"
    )]
    WindowOutOfRange {
        offset: usize,
        search_length: usize,
        buffer_length: usize,
    },

    /// A frame of the wrong size was handed to the detector
    #[error("Frame length mismatch: expected {expected}, got {actual}")]
    FrameLengthMismatch { expected: usize, actual: usize },

    /// Frame assembler hop outside `1..=frame_length`
    #[error("Invalid hop length {hop} for frame length {frame_length}")]
    InvalidHopLength { hop: usize, frame_length: usize },
}
