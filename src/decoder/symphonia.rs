use super::{interleaved_frame, layout_for};
use crate::core::{AudioFrame, Channels};
use crate::error::{AudioError, AudioResult};
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Symphonia-based audio decoder for compressed and non-WAV containers
pub struct SymphoniaDecoder {
    /// Current reader for the audio source
    reader: Box<dyn FormatReader>,
    /// Track being decoded
    track_id: u32,
    /// Sample rate
    sample_rate: u32,
    /// Layout declared by the track, if any
    channels: Option<Channels>,
    /// Frame counter
    frame_count: u64,
    /// Whether decoding is finished
    finished: bool,
    /// Codec state
    decoder: Box<dyn symphonia::core::codecs::Decoder>,
}

impl SymphoniaDecoder {
    /// Create decoder from file path
    pub fn from_file<P: AsRef<Path>>(path: P) -> AudioResult<Self> {
        let path = path.as_ref();
        let file = Box::new(File::open(path)?);
        let mss = MediaSourceStream::new(file, Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|ext| ext.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| AudioError::UnsupportedFormat(e.to_string()))?;

        let reader = probed.format;

        // First track with a real codec
        let track = reader
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| AudioError::InvalidMetadata("No audio track found".to_string()))?;

        let track_id = track.id;
        let sample_rate = track
            .codec_params
            .sample_rate
            .ok_or_else(|| AudioError::InvalidMetadata("Unknown sample rate".to_string()))?;

        let channels = match track.codec_params.channels {
            Some(layout) => Some(layout_for(layout.count())?),
            None => None,
        };

        let decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| AudioError::DecodeError(e.to_string()))?;

        Ok(SymphoniaDecoder {
            reader,
            track_id,
            sample_rate,
            channels,
            frame_count: 0,
            finished: false,
            decoder,
        })
    }

    /// Get sample rate
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl super::Decoder for SymphoniaDecoder {
    fn decode_frame(&mut self) -> AudioResult<Option<AudioFrame>> {
        if self.finished {
            return Ok(None);
        }

        loop {
            let packet = match self.reader.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    self.finished = true;
                    return Ok(None);
                }
                Err(SymphoniaError::ResetRequired) => {
                    self.finished = true;
                    return Ok(None);
                }
                Err(e) => return Err(e.into()),
            };

            if packet.track_id() != self.track_id {
                continue;
            }

            let audio_buf = match self.decoder.decode(&packet) {
                Ok(audio_buf) => audio_buf,
                // Corrupt packet: drop it and keep going
                Err(SymphoniaError::DecodeError(_)) => continue,
                Err(e) => return Err(e.into()),
            };

            let spec = *audio_buf.spec();
            if audio_buf.frames() == 0 {
                continue;
            }

            let mut sample_buffer = SampleBuffer::<f32>::new(audio_buf.capacity() as u64, spec);
            sample_buffer.copy_interleaved_ref(audio_buf);

            let frame = interleaved_frame(
                sample_buffer.samples().to_vec(),
                spec.rate,
                spec.channels.count(),
                self.frame_count,
            )?;
            self.frame_count += 1;

            return Ok(Some(frame));
        }
    }

    fn is_finished(&self) -> bool {
        self.finished
    }

    fn stream_layout(&self) -> Option<(u32, Channels)> {
        self.channels.map(|channels| (self.sample_rate, channels))
    }
}
