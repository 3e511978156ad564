//! Waveform filters applied between decoding and feature extraction

pub mod align;
pub mod augment;
pub mod downsample;
pub mod remix;
pub mod resample;

pub use align::Align;
pub use augment::{Augment, AugmentOptions};
pub use downsample::Downsample;
pub use remix::Remix;
pub use resample::Resample;

use crate::core::AudioFrame;
use crate::error::AudioResult;

/// Trait for audio filters
pub trait Filter {
    /// Process an audio frame through this filter
    fn process(&mut self, frame: &AudioFrame) -> AudioResult<AudioFrame>;

    /// Flush any remaining audio from the filter
    fn flush(&mut self) -> AudioResult<Option<AudioFrame>> {
        Ok(None)
    }
}
