//! Error types for PCM conversion

use thiserror::Error;

use crate::format::SampleFormat;

/// Result type for PCM conversion operations
pub type Result<T> = std::result::Result<T, PcmError>;

/// Errors that can occur while converting or decoding samples
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PcmError {
    /// `SampleFormat::Undefined` was passed where a concrete format is required
    #[error("Undefined {role} sample format")]
    UndefinedFormat {
        /// Which side of the conversion was undefined ("source" or "destination")
        role: &'static str,
    },

    /// No conversion routine exists for this pair
    #[error("PCM conversion from {from} to {to} is not implemented")]
    Unsupported { from: SampleFormat, to: SampleFormat },

    /// DSD channel count outside 1..=32
    #[error("Invalid channel count: {0} (must be 1-32)")]
    InvalidChannelCount(usize),

    /// Buffer length or alignment does not match the element type
    #[error("Buffer of {len} bytes is not a whole, aligned run of {format} samples")]
    MisalignedBuffer { format: SampleFormat, len: usize },

    /// `convert()` was called on a converter that is not open
    #[error("Format converter is not open")]
    NotOpen,

    /// `open()` was called twice without `close()`
    #[error("Format converter is already open ({from} -> {to})")]
    AlreadyOpen { from: SampleFormat, to: SampleFormat },

    /// Source view does not carry the format the converter was opened with
    #[error("Source samples are {actual}, converter was opened for {expected}")]
    FormatMismatch {
        expected: SampleFormat,
        actual: SampleFormat,
    },

    /// Sample format name could not be parsed
    #[error("Invalid sample format: {0}")]
    InvalidFormat(String),
}
