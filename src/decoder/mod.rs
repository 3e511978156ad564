//! Audio decoder implementations

pub mod symphonia;
pub mod wav;

pub use symphonia::SymphoniaDecoder;
pub use wav::WavDecoder;

use crate::core::{AudioFrame, Channels};
use crate::error::{AudioError, AudioResult};
use log::debug;
use std::path::Path;

/// Trait for audio decoders
pub trait Decoder: Send {
    /// Get next audio frame from the stream
    fn decode_frame(&mut self) -> AudioResult<Option<AudioFrame>>;

    /// Check if decoder is finished
    fn is_finished(&self) -> bool;

    /// Sample rate and channel layout known from the container header
    fn stream_layout(&self) -> Option<(u32, Channels)> {
        None
    }

    /// Decode the remaining stream into a single frame
    fn decode_all(&mut self) -> AudioResult<AudioFrame> {
        let mut samples = Vec::new();
        let mut layout = None;

        while let Some(frame) = self.decode_frame()? {
            match layout {
                None => layout = Some((frame.sample_rate(), frame.channels())),
                Some((rate, channels)) => {
                    if frame.sample_rate() != rate || frame.channels() != channels {
                        return Err(AudioError::DecodeError(
                            "stream changed format mid-file".to_string(),
                        ));
                    }
                }
            }
            samples.extend_from_slice(frame.samples());
        }

        // A clean stream with no samples is an empty clip, not an error
        let (rate, channels) = layout.or_else(|| self.stream_layout()).ok_or_else(|| {
            AudioError::DecodeError("stream produced no samples and has no known layout".to_string())
        })?;
        AudioFrame::new(samples, rate, channels, 0)
    }
}

/// Build a frame from interleaved samples of any channel count
///
/// Layouts without a [`Channels`] variant are averaged down to mono.
pub(crate) fn interleaved_frame(
    samples: Vec<f32>,
    sample_rate: u32,
    channel_count: usize,
    frame_number: u64,
) -> AudioResult<AudioFrame> {
    if channel_count == 0 {
        return Err(AudioError::InvalidMetadata("stream has zero channels".to_string()));
    }
    match Channels::from_count(channel_count as u32) {
        Ok(channels) => AudioFrame::new(samples, sample_rate, channels, frame_number),
        Err(_) => {
            debug!("mixing {} channels down to mono", channel_count);
            let scale = 1.0 / channel_count as f32;
            let mono = samples
                .chunks_exact(channel_count)
                .map(|frame| frame.iter().sum::<f32>() * scale)
                .collect();
            AudioFrame::new(mono, sample_rate, Channels::Mono, frame_number)
        }
    }
}

/// Channel layout a decoder reports for `channel_count` source channels
pub(crate) fn layout_for(channel_count: usize) -> AudioResult<Channels> {
    if channel_count == 0 {
        return Err(AudioError::InvalidMetadata("stream has zero channels".to_string()));
    }
    Ok(Channels::from_count(channel_count as u32).unwrap_or(Channels::Mono))
}

/// Create a decoder from a file path
///
/// WAV files go through hound, everything else through Symphonia.
pub fn from_file<P: AsRef<Path>>(path: P) -> AudioResult<Box<dyn Decoder>> {
    let path = path.as_ref();
    let is_wav = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("wav") || ext.eq_ignore_ascii_case("wave"))
        .unwrap_or(false);

    if is_wav {
        WavDecoder::from_file(path).map(|d| Box::new(d) as Box<dyn Decoder>)
    } else {
        SymphoniaDecoder::from_file(path).map(|d| Box::new(d) as Box<dyn Decoder>)
    }
}
