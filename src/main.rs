//! audioset-features command line interface
//!
//! Prints training examples to stdout; logs go to stderr.

use audioset_features::dataset::Set;
use audioset_features::pipeline::{self, PipelineConfig};
use clap::Parser;
use log::{error, info};
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "audioset-features")]
#[command(about = "Stream training examples from labeled audio segments", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to segment CSV file
    #[arg(long, value_name = "FILE")]
    csv: PathBuf,

    /// Path to sample download directory
    #[arg(long, value_name = "DIR")]
    dir: PathBuf,

    /// PCM sample count alignment
    #[arg(long, default_value_t = 512)]
    align: usize,

    /// PCM sample stride for downsampling
    #[arg(long, default_value_t = 1)]
    stride: usize,

    /// Perform data augmentation
    #[arg(long)]
    augment: bool,

    /// Use MFCC output instead of PCM
    #[arg(long)]
    mfcc: bool,

    /// Worker threads (defaults to available parallelism)
    #[arg(long)]
    workers: Option<usize>,

    /// Stop after this many examples
    #[arg(long)]
    limit: Option<u64>,

    /// Seed for shuffling and augmentation
    #[arg(long)]
    seed: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            align: self.align,
            stride: self.stride,
            augment: self.augment,
            mfcc: self.mfcc,
            workers: self.workers.unwrap_or_else(pipeline::default_workers),
            limit: self.limit,
            seed: self.seed,
            ..PipelineConfig::default()
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    info!("audioset-features {}", audioset_features::VERSION);

    let config = cli.pipeline_config();
    let result = config
        .validate()
        .and_then(|_| Set::read(&cli.dir, &cli.csv))
        .and_then(|set| {
            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            pipeline::run_pipeline(&set, &config, &mut out)
        });

    match result {
        Ok(_) => {}
        Err(e) if e.is_broken_pipe() => info!("Output closed, stopping"),
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    }
}
