//! Producer / worker / printer pipeline that streams training examples
//!
//! One producer thread feeds shuffled sample indices to a pool of workers
//! over a rendezvous channel. Workers decode, transform and format samples
//! and hand finished records to the printer, which runs on the calling
//! thread and writes them in arrival order. The first error stops the
//! pipeline: once the printer returns, every channel disconnects and the
//! other threads wind down.

pub mod format;
pub mod sampler;
pub mod worker;

pub use format::{classes_to_line, floats_to_line, format_record};
pub use sampler::{EpochSampler, looped_samples};
pub use worker::Worker;

use crate::core::SAMPLE_RATE;
use crate::dataset::Set;
use crate::error::{AudioError, AudioResult};
use crate::features::{Mfcc, MfccOptions};
use crate::filter::{Augment, AugmentOptions};
use crossbeam_channel::{Receiver, bounded};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Write;
use std::thread;
use std::time::{Duration, Instant};

/// Pipeline settings
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// PCM output length is padded to a multiple of this
    pub align: usize,
    /// PCM decimation stride
    pub stride: usize,
    /// Apply random augmentation
    pub augment: bool,
    /// Emit MFCC features instead of PCM
    pub mfcc: bool,
    /// Worker thread count
    pub workers: usize,
    /// Stop after this many records; `None` runs forever
    pub limit: Option<u64>,
    /// RNG seed for shuffling and augmentation; `None` seeds from the OS
    pub seed: Option<u64>,
    /// Finished records buffered between workers and printer
    pub queue_depth: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            align: 512,
            stride: 1,
            augment: false,
            mfcc: false,
            workers: default_workers(),
            limit: None,
            seed: None,
            queue_depth: 1,
        }
    }
}

impl PipelineConfig {
    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> AudioResult<()> {
        if self.align == 0 {
            return Err(AudioError::ConfigError("align must be at least 1".to_string()));
        }
        if self.stride == 0 {
            return Err(AudioError::ConfigError("stride must be at least 1".to_string()));
        }
        if self.workers == 0 {
            return Err(AudioError::ConfigError("need at least one worker".to_string()));
        }
        Ok(())
    }
}

/// Worker count matching the available CPU parallelism
pub fn default_workers() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Summary of a pipeline run
#[derive(Debug, Clone, Copy)]
pub struct PipelineStats {
    /// Records written to the output
    pub records: u64,
    /// Wall time of the run
    pub elapsed: Duration,
}

impl PipelineStats {
    /// Records per second
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.records as f64 / secs
        } else {
            0.0
        }
    }
}

/// Stream examples from `set` into `out` until the limit or the first error
pub fn run_pipeline<W: Write>(
    set: &Set,
    config: &PipelineConfig,
    out: &mut W,
) -> AudioResult<PipelineStats> {
    config.validate()?;
    let start = Instant::now();

    let classes = set.classes();
    info!(
        "Streaming {} samples over {} classes with {} workers (mfcc: {}, augment: {})",
        set.len(),
        classes.len(),
        config.workers,
        config.mfcc,
        config.augment
    );

    let mut seeder = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mfcc = if config.mfcc {
        Some(Mfcc::new(MfccOptions::default(), SAMPLE_RATE)?)
    } else {
        None
    };

    let producer_rng = StdRng::seed_from_u64(seeder.r#gen());
    let workers = (0..config.workers)
        .map(|id| {
            let rng = StdRng::seed_from_u64(seeder.r#gen());
            let augment = Augment::new(AugmentOptions::default(), rng)?;
            Worker::new(id, set, &classes, config, augment, mfcc.as_ref())
        })
        .collect::<AudioResult<Vec<_>>>()?;

    let (sample_tx, sample_rx) = bounded::<usize>(0);
    let (record_tx, record_rx) = bounded::<AudioResult<String>>(config.queue_depth);

    let records = thread::scope(|scope| {
        let len = set.len();
        scope.spawn(move || {
            let sent = looped_samples(len, producer_rng, sample_tx);
            debug!("producer exiting after {} samples", sent);
        });

        for worker in workers {
            let samples = sample_rx.clone();
            let records = record_tx.clone();
            scope.spawn(move || worker.run(samples, records));
        }
        drop(sample_rx);
        drop(record_tx);

        print_records(record_rx, out, config.limit)
    })?;

    let stats = PipelineStats {
        records,
        elapsed: start.elapsed(),
    };
    info!(
        "Wrote {} records in {:.2?} ({:.1}/s)",
        stats.records,
        stats.elapsed,
        stats.rate()
    );
    Ok(stats)
}

/// Write records as they arrive, one flush per record
///
/// Consumes the receiver so that returning disconnects the workers.
pub fn print_records<W: Write>(
    records: Receiver<AudioResult<String>>,
    out: &mut W,
    limit: Option<u64>,
) -> AudioResult<u64> {
    let mut written = 0u64;
    if limit == Some(0) {
        return Ok(0);
    }

    for record in records.iter() {
        let record = record?;
        out.write_all(record.as_bytes())?;
        out.write_all(b"\n")?;
        out.flush()?;
        written += 1;

        if limit.is_some_and(|limit| written >= limit) {
            break;
        }
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        assert!(PipelineConfig::default().validate().is_ok());
        for bad in [
            PipelineConfig { align: 0, ..PipelineConfig::default() },
            PipelineConfig { stride: 0, ..PipelineConfig::default() },
            PipelineConfig { workers: 0, ..PipelineConfig::default() },
        ] {
            assert!(matches!(bad.validate(), Err(AudioError::ConfigError(_))));
        }
    }

    #[test]
    fn test_print_records_limit() {
        let (tx, rx) = bounded(8);
        for i in 0..5 {
            tx.send(Ok(format!("{i}\n1"))).unwrap();
        }
        drop(tx);

        let mut out = Vec::new();
        assert_eq!(print_records(rx, &mut out, Some(2)).unwrap(), 2);
        assert_eq!(String::from_utf8(out).unwrap(), "0\n1\n1\n1\n");
    }

    #[test]
    fn test_print_records_stops_on_error() {
        let (tx, rx) = bounded(8);
        tx.send(Ok("0.5\n1".to_string())).unwrap();
        tx.send(Err(AudioError::DecodeError("bad clip".to_string()))).unwrap();
        tx.send(Ok("0.25\n0".to_string())).unwrap();
        drop(tx);

        let mut out = Vec::new();
        let result = print_records(rx, &mut out, None);
        assert!(matches!(result, Err(AudioError::DecodeError(_))));
        assert_eq!(String::from_utf8(out).unwrap(), "0.5\n1\n");
    }

    #[test]
    fn test_print_records_zero_limit() {
        let (tx, rx) = bounded::<AudioResult<String>>(1);
        tx.send(Ok("x".to_string())).unwrap();
        let mut out = Vec::new();
        assert_eq!(print_records(rx, &mut out, Some(0)).unwrap(), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_stats_rate() {
        let stats = PipelineStats {
            records: 10,
            elapsed: Duration::from_secs(2),
        };
        assert_eq!(stats.rate(), 5.0);
    }
}
