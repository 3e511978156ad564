#![warn(missing_docs)]

//! # audioset-features: training examples from labeled audio segments
//!
//! Reads an AudioSet-style segment CSV and a directory of downloaded clips,
//! then streams an endless, shuffled sequence of training examples: one line
//! of features (raw PCM or MFCCs) followed by one line of `0`/`1` class flags.
//!
//! ## Quick Start
//!
//! ```ignore
//! use audioset_features::dataset::Set;
//! use audioset_features::pipeline::{run_pipeline, PipelineConfig};
//!
//! let set = Set::read("clips/", "balanced_train_segments.csv")?;
//! let config = PipelineConfig { limit: Some(100), ..PipelineConfig::default() };
//! run_pipeline(&set, &config, &mut std::io::stdout().lock())?;
//! ```

/// Core audio types and structures
pub mod core;
/// Error types for audio operations
pub mod error;
/// Audio decoder implementations
pub mod decoder;
/// Segment manifests and clip lookup
pub mod dataset;
/// Waveform filters and augmentation
pub mod filter;
/// Cepstral feature extraction
pub mod features;
/// Concurrent example streaming
pub mod pipeline;

pub use core::{AudioFrame, Channels, SAMPLE_RATE};
pub use error::{AudioError, AudioResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
