use crate::error::{AudioError, AudioResult};
use std::time::Duration;

/// Rate every clip is brought to before feature extraction
pub const SAMPLE_RATE: u32 = 22050;

/// Channel configuration for audio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channels {
    /// Mono (1 channel)
    Mono = 1,
    /// Stereo (2 channels)
    Stereo = 2,
    /// Quad (4 channels)
    Quad = 4,
    /// 5.1 surround sound
    SurroundFivePointOne = 6,
    /// 7.1 surround sound
    SurroundSevenPointOne = 8,
}

impl Channels {
    /// Create Channels from channel count
    pub fn from_count(count: u32) -> AudioResult<Self> {
        match count {
            1 => Ok(Channels::Mono),
            2 => Ok(Channels::Stereo),
            4 => Ok(Channels::Quad),
            6 => Ok(Channels::SurroundFivePointOne),
            8 => Ok(Channels::SurroundSevenPointOne),
            n => Err(AudioError::InvalidMetadata(format!(
                "unsupported channel count {n}"
            ))),
        }
    }

    /// Get the number of channels
    pub fn count(&self) -> u32 {
        *self as u32
    }

    /// Get channel layout name
    pub fn name(&self) -> &'static str {
        match self {
            Channels::Mono => "Mono",
            Channels::Stereo => "Stereo",
            Channels::Quad => "Quad",
            Channels::SurroundFivePointOne => "5.1 Surround",
            Channels::SurroundSevenPointOne => "7.1 Surround",
        }
    }
}

/// Audio frame containing samples and metadata
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Audio samples (interleaved for multiple channels)
    samples: Vec<f32>,
    /// Sample rate in Hz
    sample_rate: u32,
    /// Number of channels
    channels: Channels,
    /// Frame number in the audio stream
    frame_number: u64,
}

impl AudioFrame {
    /// Create a new audio frame
    pub fn new(
        samples: Vec<f32>,
        sample_rate: u32,
        channels: Channels,
        frame_number: u64,
    ) -> AudioResult<Self> {
        if sample_rate == 0 {
            return Err(AudioError::InvalidSampleRate { rate: sample_rate });
        }

        if samples.len() % channels.count() as usize != 0 {
            return Err(AudioError::BufferError(
                "Sample count not divisible by channel count".to_string(),
            ));
        }

        Ok(AudioFrame {
            samples,
            sample_rate,
            channels,
            frame_number,
        })
    }

    /// Create a mono frame
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> AudioResult<Self> {
        Self::new(samples, sample_rate, Channels::Mono, 0)
    }

    /// New frame with the same metadata and a replacement buffer
    pub fn with_samples(&self, samples: Vec<f32>, sample_rate: u32) -> AudioResult<Self> {
        Self::new(samples, sample_rate, self.channels, self.frame_number)
    }

    /// Get reference to the samples
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Get mutable reference to the samples
    pub fn samples_mut(&mut self) -> &mut [f32] {
        &mut self.samples
    }

    /// Get owned samples (consumes frame)
    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    /// Get sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Get channel configuration
    pub fn channels(&self) -> Channels {
        self.channels
    }

    /// Get number of samples per channel
    pub fn samples_per_channel(&self) -> usize {
        self.samples.len() / self.channels.count() as usize
    }

    /// Get frame number
    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }

    /// Get duration of this frame
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.samples_per_channel() as f64 / self.sample_rate as f64)
    }

    /// Check if frame is empty
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channels_from_count() {
        assert_eq!(Channels::from_count(1).unwrap(), Channels::Mono);
        assert_eq!(Channels::from_count(2).unwrap(), Channels::Stereo);
        assert!(Channels::from_count(0).is_err());
        assert!(Channels::from_count(3).is_err());
    }

    #[test]
    fn test_audio_frame_creation() {
        let frame = AudioFrame::new(vec![0.1, 0.2, 0.3, 0.4], 44100, Channels::Stereo, 0).unwrap();

        assert_eq!(frame.sample_rate(), 44100);
        assert_eq!(frame.channels(), Channels::Stereo);
        assert_eq!(frame.samples_per_channel(), 2);
    }

    #[test]
    fn test_audio_frame_invalid_samples() {
        // Odd number of samples for stereo should fail
        let result = AudioFrame::new(vec![0.1, 0.2, 0.3], 44100, Channels::Stereo, 0);
        assert!(result.is_err());
    }

    #[test]
    fn test_audio_frame_zero_rate() {
        assert!(AudioFrame::mono(vec![0.0], 0).is_err());
    }

    #[test]
    fn test_with_samples_keeps_metadata() {
        let frame = AudioFrame::new(vec![0.0; 4], SAMPLE_RATE, Channels::Mono, 7).unwrap();
        let other = frame.with_samples(vec![1.0; 2], 11025).unwrap();

        assert_eq!(other.frame_number(), 7);
        assert_eq!(other.sample_rate(), 11025);
        assert_eq!(other.samples(), &[1.0, 1.0]);
        assert_eq!(other.duration(), Duration::from_secs_f64(2.0 / 11025.0));
    }
}
