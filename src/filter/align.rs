use crate::core::AudioFrame;
use crate::error::{AudioError, AudioResult};

/// Zero-pads a buffer up to the next multiple of `align` samples
#[derive(Debug, Clone, Copy)]
pub struct Align {
    align: usize,
}

impl Align {
    /// Create an aligner; `align` must be at least 1
    pub fn new(align: usize) -> AudioResult<Self> {
        if align == 0 {
            return Err(AudioError::ConfigError(
                "align must be at least 1".to_string(),
            ));
        }
        Ok(Align { align })
    }

    /// Get the alignment
    pub fn align(&self) -> usize {
        self.align
    }

    /// Pad `data` in place
    pub fn pad(&self, data: &mut Vec<f32>) {
        let rem = data.len() % self.align;
        if rem != 0 {
            data.resize(data.len() + self.align - rem, 0.0);
        }
    }
}

impl super::Filter for Align {
    fn process(&mut self, frame: &AudioFrame) -> AudioResult<AudioFrame> {
        let mut samples = frame.samples().to_vec();
        self.pad(&mut samples);
        frame.with_samples(samples, frame.sample_rate())
    }
}
