use super::{interleaved_frame, layout_for};
use crate::core::{AudioFrame, Channels};
use crate::error::{AudioError, AudioResult};
use hound::{SampleFormat, WavReader};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Samples per channel handed out per frame
const FRAME_LEN: usize = 4096;

/// hound-based WAV decoder
pub struct WavDecoder {
    reader: WavReader<BufReader<File>>,
    sample_rate: u32,
    /// Channel count in the file
    channel_count: usize,
    /// Layout of decoded frames; odd counts decode as mono
    channels: Channels,
    format: SampleFormat,
    bits_per_sample: u16,
    frame_count: u64,
    finished: bool,
}

impl WavDecoder {
    /// Open a WAV file
    pub fn from_file<P: AsRef<Path>>(path: P) -> AudioResult<Self> {
        let reader = WavReader::open(path)?;
        let spec = reader.spec();

        if spec.sample_rate == 0 {
            return Err(AudioError::InvalidSampleRate { rate: 0 });
        }
        let channel_count = spec.channels as usize;
        let channels = layout_for(channel_count)?;

        Ok(WavDecoder {
            reader,
            sample_rate: spec.sample_rate,
            channel_count,
            channels,
            format: spec.sample_format,
            bits_per_sample: spec.bits_per_sample,
            frame_count: 0,
            finished: false,
        })
    }

    /// Get sample rate
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Get channels
    pub fn channels(&self) -> Channels {
        self.channels
    }

    fn read_chunk(&mut self, max: usize) -> AudioResult<Vec<f32>> {
        let mut samples = Vec::with_capacity(max);
        match self.format {
            SampleFormat::Float => {
                for sample in self.reader.samples::<f32>().take(max) {
                    samples.push(sample?);
                }
            }
            SampleFormat::Int => {
                let scale = 1.0 / (1u64 << (self.bits_per_sample - 1)) as f32;
                for sample in self.reader.samples::<i32>().take(max) {
                    samples.push(sample? as f32 * scale);
                }
            }
        }
        Ok(samples)
    }
}

impl super::Decoder for WavDecoder {
    fn decode_frame(&mut self) -> AudioResult<Option<AudioFrame>> {
        if self.finished {
            return Ok(None);
        }

        let want = FRAME_LEN * self.channel_count;
        let samples = self.read_chunk(want)?;
        if samples.len() < want {
            self.finished = true;
        }
        if samples.is_empty() {
            return Ok(None);
        }

        // A truncated final block can leave a partial multichannel frame
        let whole = samples.len() - samples.len() % self.channel_count;
        let mut samples = samples;
        samples.truncate(whole);

        let frame = interleaved_frame(samples, self.sample_rate, self.channel_count, self.frame_count)?;
        self.frame_count += 1;
        Ok(Some(frame))
    }

    fn is_finished(&self) -> bool {
        self.finished
    }

    fn stream_layout(&self) -> Option<(u32, Channels)> {
        Some((self.sample_rate, self.channels))
    }
}
