use crate::core::{AudioFrame, Channels, SAMPLE_RATE};
use crate::dataset::manifest::{SegmentRecord, read_manifest};
use crate::decoder;
use crate::error::{AudioError, AudioResult};
use crate::filter::{Filter, Remix, Resample};
use log::{debug, info, warn};
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

/// Extensions accepted when a clip is not stored as WAV
const AUDIO_EXTENSIONS: &[&str] = &["wav", "wave", "flac", "mp3", "ogg", "m4a", "aac", "mkv", "webm"];

/// A downloaded, labeled audio segment
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// YouTube video ID
    pub id: String,
    /// Segment start in seconds
    pub start: f64,
    /// Segment end in seconds
    pub end: f64,
    /// Positive label IDs
    pub classes: Vec<String>,
    /// Clip location on disk
    pub path: PathBuf,
}

impl Sample {
    /// Decode the clip as mono samples at [`SAMPLE_RATE`]
    pub fn read(&self) -> AudioResult<Vec<f32>> {
        let frame = decoder::from_file(&self.path)?.decode_all()?;

        let frame = if frame.channels() == Channels::Mono {
            frame
        } else {
            Remix::new(frame.channels(), Channels::Mono)?.process(&frame)?
        };

        let frame = if frame.sample_rate() == SAMPLE_RATE {
            frame
        } else {
            debug!(
                "{}: resampling {} Hz -> {} Hz",
                self.path.display(),
                frame.sample_rate(),
                SAMPLE_RATE
            );
            Resample::new(frame.sample_rate(), SAMPLE_RATE, Channels::Mono)?.process(&frame)?
        };

        Ok(frame.into_samples())
    }

    /// Read the clip as a mono frame at [`SAMPLE_RATE`]
    pub fn read_frame(&self) -> AudioResult<AudioFrame> {
        AudioFrame::mono(self.read()?, SAMPLE_RATE)
    }

    /// One flag per class in `classes`, set when this sample carries it
    pub fn class_vector(&self, classes: &[String]) -> Vec<bool> {
        classes
            .iter()
            .map(|class| self.classes.iter().any(|c| c == class))
            .collect()
    }
}

/// The samples of a manifest whose clips are present on disk
#[derive(Debug, Clone)]
pub struct Set {
    samples: Vec<Sample>,
}

impl Set {
    /// Load a manifest and match its rows against the clips in `dir`
    pub fn read<P: AsRef<Path>, Q: AsRef<Path>>(dir: P, csv_path: Q) -> AudioResult<Self> {
        let dir = dir.as_ref();
        let records = read_manifest(csv_path.as_ref())?;
        let index = index_clips(dir)?;

        let total = records.len();
        let mut samples = Vec::with_capacity(total);
        let mut missing = 0usize;
        for record in records {
            match locate_clip(dir, &index, &record) {
                Some(path) => samples.push(Sample {
                    id: record.id,
                    start: record.start,
                    end: record.end,
                    classes: record.labels,
                    path,
                }),
                None => {
                    warn!("no clip for segment {} at {}s", record.id, record.start_field);
                    missing += 1;
                }
            }
        }

        info!(
            "Loaded {} of {} segments from {} ({} missing)",
            samples.len(),
            total,
            csv_path.as_ref().display(),
            missing
        );

        if samples.is_empty() {
            return Err(AudioError::EmptyDataset(dir.display().to_string()));
        }
        Ok(Set { samples })
    }

    /// Build a set from samples directly
    pub fn from_samples(samples: Vec<Sample>) -> Self {
        Set { samples }
    }

    /// Sorted union of every sample's labels
    pub fn classes(&self) -> Vec<String> {
        self.samples
            .iter()
            .flat_map(|s| s.classes.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the set has no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample at `index`
    pub fn get(&self, index: usize) -> Option<&Sample> {
        self.samples.get(index)
    }

    /// Iterate over the samples
    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }
}

/// File stem of each audio file in `dir`
fn index_clips(dir: &Path) -> AudioResult<HashMap<String, PathBuf>> {
    let mut index = HashMap::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        let is_audio = ext
            .as_deref()
            .map(|e| AUDIO_EXTENSIONS.contains(&e))
            .unwrap_or(false);
        if !is_audio || !path.is_file() {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            index.entry(stem.to_string()).or_insert(path.clone());
        }
    }
    Ok(index)
}

fn locate_clip(dir: &Path, index: &HashMap<String, PathBuf>, record: &SegmentRecord) -> Option<PathBuf> {
    let stem = format!("{}_{}", record.id, record.start_field);
    let wav = dir.join(format!("{stem}.wav"));
    if wav.is_file() {
        return Some(wav);
    }
    index.get(&stem).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{SampleFormat, WavSpec, WavWriter};
    use tempfile::TempDir;

    fn write_clip(path: &Path, rate: u32, channels: u16, frames: usize) {
        let spec = WavSpec {
            channels,
            sample_rate: rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec).unwrap();
        for i in 0..frames * channels as usize {
            writer.write_sample(((i % 64) as i16 - 32) * 100).unwrap();
        }
        writer.finalize().unwrap();
    }

    fn sample(classes: &[&str]) -> Sample {
        Sample {
            id: "x".to_string(),
            start: 0.0,
            end: 10.0,
            classes: classes.iter().map(|c| c.to_string()).collect(),
            path: PathBuf::from("x_0.000.wav"),
        }
    }

    #[test]
    fn test_read_skips_missing_clips() {
        let dir = TempDir::new().unwrap();
        write_clip(&dir.path().join("aaa_30.000.wav"), SAMPLE_RATE, 1, 100);
        let csv = dir.path().join("segments.csv");
        fs::write(
            &csv,
            "# YTID, start_seconds, end_seconds, positive_labels\n\
             aaa, 30.000, 40.000, \"/m/b,/m/a\"\n\
             bbb, 0.000, 10.000, \"/m/c\"\n",
        )
        .unwrap();

        let set = Set::read(dir.path(), &csv).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(0).unwrap().id, "aaa");
        assert_eq!(set.classes(), vec!["/m/a", "/m/b"]);
    }

    #[test]
    fn test_read_empty_dataset() {
        let dir = TempDir::new().unwrap();
        let csv = dir.path().join("segments.csv");
        fs::write(&csv, "zzz, 0.000, 10.000, \"/m/c\"\n").unwrap();

        assert!(matches!(
            Set::read(dir.path(), &csv),
            Err(AudioError::EmptyDataset(_))
        ));
    }

    #[test]
    fn test_locate_other_extension() {
        let dir = TempDir::new().unwrap();
        let flac = dir.path().join("ccc_5.5.flac");
        fs::write(&flac, b"").unwrap();
        let index = index_clips(dir.path()).unwrap();
        let record = SegmentRecord {
            id: "ccc".to_string(),
            start_field: "5.5".to_string(),
            start: 5.5,
            end: 15.5,
            labels: vec![],
        };
        assert_eq!(locate_clip(dir.path(), &index, &record), Some(flac));
    }

    #[test]
    fn test_classes_sorted_unique() {
        let set = Set::from_samples(vec![sample(&["/m/z", "/m/a"]), sample(&["/m/a", "/m/k"])]);
        assert_eq!(set.classes(), vec!["/m/a", "/m/k", "/m/z"]);
    }

    #[test]
    fn test_class_vector() {
        let classes: Vec<String> = ["/m/a", "/m/k", "/m/z"].iter().map(|s| s.to_string()).collect();
        assert_eq!(sample(&["/m/z"]).class_vector(&classes), vec![false, false, true]);
        assert_eq!(sample(&[]).class_vector(&classes), vec![false, false, false]);
    }

    #[test]
    fn test_read_mixes_and_resamples() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("s_0.wav");
        write_clip(&path, 44100, 2, 44100);

        let mut s = sample(&[]);
        s.path = path;
        let data = s.read().unwrap();
        assert_eq!(data.len(), SAMPLE_RATE as usize);
        assert!(data.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn test_read_three_channel_clip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("s_0.wav");
        write_clip(&path, SAMPLE_RATE, 3, 500);

        let mut s = sample(&[]);
        s.path = path;
        assert_eq!(s.read().unwrap().len(), 500);
    }

    #[test]
    fn test_read_empty_clip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("s_0.wav");
        write_clip(&path, 44100, 2, 0);

        let mut s = sample(&[]);
        s.path = path;
        assert!(s.read().unwrap().is_empty());
    }

    #[test]
    fn test_read_native_rate_is_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("s_0.wav");
        write_clip(&path, SAMPLE_RATE, 1, 1000);

        let mut s = sample(&[]);
        s.path = path;
        let frame = s.read_frame().unwrap();
        assert_eq!(frame.samples().len(), 1000);
        assert_eq!(frame.samples()[0], -3200.0 / 32768.0);
    }
}
