use crate::dataset::{Sample, Set};
use crate::error::AudioResult;
use crate::features::Mfcc;
use crate::filter::{Align, Augment, Downsample, Filter};
use crate::pipeline::format::format_record;
use crate::pipeline::PipelineConfig;
use crossbeam_channel::{Receiver, Sender};
use log::{debug, error};

/// Turns dataset samples into formatted example records
pub struct Worker<'a> {
    id: usize,
    set: &'a Set,
    classes: &'a [String],
    downsample: Downsample,
    align: Align,
    augment: Option<Augment>,
    mfcc: Option<&'a Mfcc>,
}

impl<'a> Worker<'a> {
    /// Build a worker; `augment` is only kept when the config enables it
    pub fn new(
        id: usize,
        set: &'a Set,
        classes: &'a [String],
        config: &PipelineConfig,
        augment: Augment,
        mfcc: Option<&'a Mfcc>,
    ) -> AudioResult<Self> {
        Ok(Worker {
            id,
            set,
            classes,
            downsample: Downsample::new(config.stride)?,
            align: Align::new(config.align)?,
            augment: config.augment.then_some(augment),
            mfcc,
        })
    }

    /// Read, transform and format one sample
    ///
    /// PCM output is decimated before augmentation and padded last; MFCC
    /// output skips both decimation and padding.
    pub fn process(&mut self, sample: &Sample) -> AudioResult<String> {
        let mut frame = sample.read_frame()?;

        if self.mfcc.is_none() {
            frame = self.downsample.process(&frame)?;
        }
        if let Some(augment) = self.augment.as_mut() {
            frame = augment.process(&frame)?;
        }

        let features = match self.mfcc {
            Some(mfcc) => mfcc.compute(frame.samples())?,
            None => self.align.process(&frame)?.into_samples(),
        };

        Ok(format_record(&features, &sample.class_vector(self.classes)))
    }

    /// Process indices from `samples` until either channel closes or a
    /// sample fails; returns the number of records sent
    pub fn run(mut self, samples: Receiver<usize>, records: Sender<AudioResult<String>>) -> u64 {
        let mut sent = 0u64;
        for index in samples.iter() {
            let Some(sample) = self.set.get(index) else {
                continue;
            };

            let result = self.process(sample);
            let failed = result.is_err();
            if failed {
                error!("worker {}: failed on {}", self.id, sample.path.display());
            }
            if records.send(result).is_err() || failed {
                break;
            }
            sent += 1;
        }
        debug!("worker {} exiting after {} records", self.id, sent);
        sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SAMPLE_RATE;
    use crate::features::MfccOptions;
    use hound::{SampleFormat, WavSpec, WavWriter};
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn write_clip(path: &Path, frames: usize) {
        let spec = WavSpec {
            channels: 1,
            sample_rate: SAMPLE_RATE,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec).unwrap();
        for i in 0..frames {
            writer.write_sample((i as i16) * 1024).unwrap();
        }
        writer.finalize().unwrap();
    }

    fn sample(path: PathBuf, classes: &[&str]) -> Sample {
        Sample {
            id: "id".to_string(),
            start: 0.0,
            end: 10.0,
            classes: classes.iter().map(|c| c.to_string()).collect(),
            path,
        }
    }

    fn config(align: usize, stride: usize) -> PipelineConfig {
        PipelineConfig {
            align,
            stride,
            workers: 1,
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn test_pcm_record_downsampled_and_padded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("id_0.wav");
        write_clip(&path, 5);

        let s = sample(path, &["/m/b"]);
        let set = Set::from_samples(vec![s.clone()]);
        let classes = vec!["/m/a".to_string(), "/m/b".to_string()];
        let mut worker =
            Worker::new(0, &set, &classes, &config(4, 2), Augment::from_seed(0), None).unwrap();

        // Samples 0, 1024, 2048, 3072, 4096 scaled by 1/32768, stride 2, pad to 4
        let record = worker.process(&s).unwrap();
        assert_eq!(record, "0 0.0625 0.125 0\n0 1");
    }

    #[test]
    fn test_mfcc_record_skips_stride_and_align() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("id_0.wav");
        write_clip(&path, 441);

        let s = sample(path, &[]);
        let set = Set::from_samples(vec![s.clone()]);
        let classes = vec!["/m/a".to_string()];
        let mfcc = Mfcc::new(MfccOptions::default(), SAMPLE_RATE).unwrap();
        let mut worker = Worker::new(
            0,
            &set,
            &classes,
            &config(512, 4),
            Augment::from_seed(0),
            Some(&mfcc),
        )
        .unwrap();

        let record = worker.process(&s).unwrap();
        let (features, class_line) = record.split_once('\n').unwrap();
        // ceil(441 / 220) == 3 frames of 13 coefficients
        assert_eq!(features.split(' ').count(), 3 * 13);
        assert_eq!(class_line, "0");
    }

    #[test]
    fn test_run_forwards_first_error() {
        let s = sample(PathBuf::from("/nonexistent/id_0.wav"), &[]);
        let set = Set::from_samples(vec![s]);
        let classes: Vec<String> = Vec::new();
        let worker =
            Worker::new(0, &set, &classes, &config(512, 1), Augment::from_seed(0), None).unwrap();

        let (sample_tx, sample_rx) = crossbeam_channel::unbounded();
        let (record_tx, record_rx) = crossbeam_channel::unbounded();
        sample_tx.send(0).unwrap();
        sample_tx.send(0).unwrap();
        drop(sample_tx);

        assert_eq!(worker.run(sample_rx, record_tx), 0);
        let results: Vec<_> = record_rx.iter().collect();
        assert_eq!(results.len(), 1);
        assert!(results[0].is_err());
    }
}
