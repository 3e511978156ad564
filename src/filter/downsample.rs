use crate::core::AudioFrame;
use crate::error::{AudioError, AudioResult};

/// Keeps every `stride`th sample, starting with the first
///
/// No anti-aliasing is applied; this is plain decimation.
#[derive(Debug, Clone, Copy)]
pub struct Downsample {
    stride: usize,
}

impl Downsample {
    /// Create a decimator; `stride` must be at least 1
    pub fn new(stride: usize) -> AudioResult<Self> {
        if stride == 0 {
            return Err(AudioError::ConfigError(
                "stride must be at least 1".to_string(),
            ));
        }
        Ok(Downsample { stride })
    }

    /// Get the stride
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Decimate a buffer; the result has `ceil(len / stride)` samples
    pub fn apply(&self, data: &[f32]) -> Vec<f32> {
        if self.stride == 1 {
            return data.to_vec();
        }
        data.iter().step_by(self.stride).copied().collect()
    }
}

impl super::Filter for Downsample {
    fn process(&mut self, frame: &AudioFrame) -> AudioResult<AudioFrame> {
        if self.stride == 1 {
            return Ok(frame.clone());
        }
        let rate = (frame.sample_rate() / self.stride as u32).max(1);
        frame.with_samples(self.apply(frame.samples()), rate)
    }
}
