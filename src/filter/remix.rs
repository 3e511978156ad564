use crate::core::{AudioFrame, Channels};
use crate::error::{AudioError, AudioResult};

/// Audio channel remixer - converts between channel layouts
pub struct Remix {
    input_channels: Channels,
    output_channels: Channels,
}

impl Remix {
    /// Create a new channel remixer
    pub fn new(input_channels: Channels, output_channels: Channels) -> AudioResult<Self> {
        Ok(Remix {
            input_channels,
            output_channels,
        })
    }

    /// Average every channel of each interleaved frame into one sample
    fn downmix_to_mono(input: &[f32], channels: usize) -> Vec<f32> {
        let scale = 1.0 / channels as f32;
        input
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() * scale)
            .collect()
    }

    /// Remix mono to stereo by duplicating the channel
    fn mono_to_stereo(input: &[f32]) -> Vec<f32> {
        input.iter().flat_map(|&sample| [sample, sample]).collect()
    }
}

impl super::Filter for Remix {
    fn process(&mut self, frame: &AudioFrame) -> AudioResult<AudioFrame> {
        if frame.channels() != self.input_channels {
            return Err(AudioError::InvalidMetadata(format!(
                "remix expected {} input, got {}",
                self.input_channels.name(),
                frame.channels().name()
            )));
        }

        let samples = frame.samples();

        let output_samples = match (self.input_channels, self.output_channels) {
            (src, dst) if src == dst => samples.to_vec(),
            (src, Channels::Mono) => Self::downmix_to_mono(samples, src.count() as usize),
            (Channels::Mono, Channels::Stereo) => Self::mono_to_stereo(samples),
            _ => {
                return Err(AudioError::ProcessingError(format!(
                    "Remix from {} to {} not supported",
                    self.input_channels.name(),
                    self.output_channels.name()
                )));
            }
        };

        AudioFrame::new(
            output_samples,
            frame.sample_rate(),
            self.output_channels,
            frame.frame_number(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Filter;

    #[test]
    fn test_remix_stereo_to_mono() {
        // [L1, R1, L2, R2]
        let output = Remix::downmix_to_mono(&[0.0, 1.0, 0.5, 0.5], 2);

        assert_eq!(output.len(), 2);
        assert!((output[0] - 0.5).abs() < 0.001);
        assert!((output[1] - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_remix_surround_to_mono() {
        let frame = AudioFrame::new(
            vec![0.6; 12],
            48000,
            Channels::SurroundFivePointOne,
            0,
        )
        .unwrap();
        let mut remix = Remix::new(Channels::SurroundFivePointOne, Channels::Mono).unwrap();
        let out = remix.process(&frame).unwrap();

        assert_eq!(out.channels(), Channels::Mono);
        assert_eq!(out.samples().len(), 2);
        assert!((out.samples()[0] - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_remix_mono_to_stereo() {
        let output = Remix::mono_to_stereo(&[0.5, 0.8]);
        assert_eq!(output, vec![0.5, 0.5, 0.8, 0.8]);
    }

    #[test]
    fn test_remix_wrong_input_layout() {
        let frame = AudioFrame::mono(vec![0.1, 0.2], 22050).unwrap();
        let mut remix = Remix::new(Channels::Stereo, Channels::Mono).unwrap();
        assert!(remix.process(&frame).is_err());
    }
}
