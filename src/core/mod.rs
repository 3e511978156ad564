//! Core audio types and structures

/// Audio frame and channel types
pub mod audio;

pub use audio::{AudioFrame, Channels, SAMPLE_RATE};
