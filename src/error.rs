use std::io;
use thiserror::Error;

/// Result type for audio operations
pub type AudioResult<T> = Result<T, AudioError>;

/// Error types for dataset loading and feature extraction
#[derive(Error, Debug)]
pub enum AudioError {
    /// IO error (file operations, disk access, output stream)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Unsupported audio format
    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    /// Invalid audio metadata
    #[error("Invalid audio metadata: {0}")]
    InvalidMetadata(String),

    /// Decoding failed
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// Resampling operation failed
    #[error("Resampling error: {0}")]
    ResamplingError(String),

    /// Invalid sample rate
    #[error("Invalid sample rate: {rate}")]
    InvalidSampleRate {
        /// The invalid sample rate
        rate: u32,
    },

    /// Buffer-related error
    #[error("Buffer error: {0}")]
    BufferError(String),

    /// Malformed segment manifest record
    #[error("Manifest error at line {line}: {message}")]
    Manifest {
        /// 1-based line number in the CSV file
        line: u64,
        /// What was wrong with the record
        message: String,
    },

    /// CSV reader failure
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// No sample in the manifest has a clip on disk
    #[error("Dataset is empty: no listed segment has a clip in {0}")]
    EmptyDataset(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Audio processing error
    #[error("Processing error: {0}")]
    ProcessingError(String),
}

impl From<symphonia::core::errors::Error> for AudioError {
    fn from(err: symphonia::core::errors::Error) -> Self {
        match err {
            symphonia::core::errors::Error::IoError(e) => AudioError::Io(e),
            e => AudioError::DecodeError(e.to_string()),
        }
    }
}

impl From<hound::Error> for AudioError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(e) => AudioError::Io(e),
            hound::Error::Unsupported => {
                AudioError::UnsupportedFormat("unsupported WAV encoding".to_string())
            }
            e => AudioError::DecodeError(e.to_string()),
        }
    }
}

impl From<rubato::ResamplerConstructionError> for AudioError {
    fn from(err: rubato::ResamplerConstructionError) -> Self {
        AudioError::ResamplingError(err.to_string())
    }
}

impl From<rubato::ResampleError> for AudioError {
    fn from(err: rubato::ResampleError) -> Self {
        AudioError::ResamplingError(err.to_string())
    }
}

impl AudioError {
    /// True when the error is a closed output pipe (e.g. `| head`)
    pub fn is_broken_pipe(&self) -> bool {
        matches!(self, AudioError::Io(e) if e.kind() == io::ErrorKind::BrokenPipe)
    }
}
