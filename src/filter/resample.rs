use crate::core::{AudioFrame, Channels};
use crate::error::{AudioError, AudioResult};
use rubato::{FftFixedIn, Resampler};

/// Input block size fed to the FFT resampler
const CHUNK_SIZE: usize = 1024;

/// Mono sample-rate converter backed by rubato's FFT resampler
pub struct Resample {
    input_rate: u32,
    output_rate: u32,
    channels: Channels,
}

impl Resample {
    /// Create a new resampler
    ///
    /// # Arguments
    /// * `input_rate` - Input sample rate in Hz
    /// * `output_rate` - Output sample rate in Hz
    /// * `channels` - Channel layout; only mono is supported
    pub fn new(input_rate: u32, output_rate: u32, channels: Channels) -> AudioResult<Self> {
        if input_rate == 0 || output_rate == 0 {
            return Err(AudioError::InvalidSampleRate { rate: 0 });
        }
        if channels != Channels::Mono {
            return Err(AudioError::ResamplingError(format!(
                "only mono input is supported, got {}",
                channels.name()
            )));
        }

        Ok(Resample {
            input_rate,
            output_rate,
            channels,
        })
    }

    /// Get the input sample rate
    pub fn input_rate(&self) -> u32 {
        self.input_rate
    }

    /// Get the output sample rate
    pub fn output_rate(&self) -> u32 {
        self.output_rate
    }

    /// Number of output samples for `input_len` input samples
    pub fn output_len(&self, input_len: usize) -> usize {
        (input_len as u64 * self.output_rate as u64).div_ceil(self.input_rate as u64) as usize
    }

    fn resample_mono(&self, input: &[f32]) -> AudioResult<Vec<f32>> {
        let expected = self.output_len(input.len());
        if input.is_empty() {
            return Ok(Vec::new());
        }

        let mut resampler = FftFixedIn::<f32>::new(
            self.input_rate as usize,
            self.output_rate as usize,
            CHUNK_SIZE,
            2,
            1,
        )?;
        let delay = resampler.output_delay();
        let mut output = Vec::with_capacity(expected + delay);

        let mut chunks = input.chunks_exact(CHUNK_SIZE);
        for chunk in &mut chunks {
            let out = resampler.process(&[chunk], None)?;
            output.extend_from_slice(&out[0]);
        }

        let tail = chunks.remainder();
        if !tail.is_empty() {
            let out = resampler.process_partial(Some(&[tail][..]), None)?;
            output.extend_from_slice(&out[0]);
        }

        // Drain the filter delay with silence
        while output.len() < expected + delay {
            let out = resampler.process_partial::<&[f32]>(None, None)?;
            if out[0].is_empty() {
                break;
            }
            output.extend_from_slice(&out[0]);
        }

        output.drain(..delay.min(output.len()));
        output.resize(expected, 0.0);
        Ok(output)
    }
}

impl super::Filter for Resample {
    fn process(&mut self, frame: &AudioFrame) -> AudioResult<AudioFrame> {
        if frame.channels() != self.channels {
            return Err(AudioError::InvalidMetadata(format!(
                "resampler expects {}, got {}",
                self.channels.name(),
                frame.channels().name()
            )));
        }

        if frame.sample_rate() != self.input_rate {
            return Err(AudioError::InvalidSampleRate {
                rate: frame.sample_rate(),
            });
        }

        if self.input_rate == self.output_rate {
            return Ok(frame.clone());
        }

        let resampled = self.resample_mono(frame.samples())?;
        frame.with_samples(resampled, self.output_rate)
    }
}
