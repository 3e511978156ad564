use crate::error::{AudioError, AudioResult};
use realfft::num_complex::Complex32;
use realfft::{RealFftPlanner, RealToComplex};
use std::f32::consts::PI;
use std::sync::Arc;
use std::time::Duration;

/// Floor added to mel energies before the log
const LOG_FLOOR: f32 = 1e-10;

/// MFCC analysis parameters
#[derive(Debug, Clone)]
pub struct MfccOptions {
    /// Analysis window length
    pub window: Duration,
    /// Distance between consecutive window starts
    pub hop: Duration,
    /// FFT size; must be at least the window length in samples
    pub fft_size: usize,
    /// Number of triangular mel filters
    pub mel_count: usize,
    /// Lowest filter edge in Hz
    pub low_freq: f32,
    /// Highest filter edge in Hz
    pub high_freq: f32,
    /// Cepstral coefficients kept per frame
    pub keep: usize,
}

impl Default for MfccOptions {
    fn default() -> Self {
        MfccOptions {
            window: Duration::from_millis(20),
            hop: Duration::from_millis(10),
            fft_size: 512,
            mel_count: 26,
            low_freq: 300.0,
            high_freq: 8000.0,
            keep: 13,
        }
    }
}

/// Mel-frequency cepstral coefficient extractor for mono waveforms
pub struct Mfcc {
    plan: Arc<dyn RealToComplex<f32>>,
    window: Vec<f32>,
    hop: usize,
    filters: Vec<Vec<f32>>,
    dct: Vec<Vec<f32>>,
}

impl Mfcc {
    /// Build an extractor for audio at `sample_rate`
    pub fn new(options: MfccOptions, sample_rate: u32) -> AudioResult<Self> {
        if sample_rate == 0 {
            return Err(AudioError::InvalidSampleRate { rate: 0 });
        }
        let window_len = (options.window.as_secs_f64() * sample_rate as f64) as usize;
        let hop = (options.hop.as_secs_f64() * sample_rate as f64) as usize;

        if window_len == 0 || hop == 0 {
            return Err(AudioError::ConfigError(
                "MFCC window and hop must cover at least one sample".to_string(),
            ));
        }
        if window_len > options.fft_size {
            return Err(AudioError::ConfigError(format!(
                "MFCC window of {} samples exceeds FFT size {}",
                window_len, options.fft_size
            )));
        }
        if options.mel_count == 0 || options.keep == 0 || options.keep > options.mel_count {
            return Err(AudioError::ConfigError(format!(
                "cannot keep {} coefficients from {} mel filters",
                options.keep, options.mel_count
            )));
        }
        let nyquist = sample_rate as f32 / 2.0;
        if !(0.0 <= options.low_freq && options.low_freq < options.high_freq) || options.high_freq > nyquist {
            return Err(AudioError::ConfigError(format!(
                "mel range {}..{} Hz invalid at {} Hz",
                options.low_freq, options.high_freq, sample_rate
            )));
        }

        let mut planner = RealFftPlanner::<f32>::new();
        let plan = planner.plan_fft_forward(options.fft_size);

        Ok(Mfcc {
            plan,
            window: hamming_window(window_len),
            hop,
            filters: mel_filters(&options, sample_rate),
            dct: dct_table(options.keep, options.mel_count),
        })
    }

    /// Window length in samples
    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    /// Hop length in samples
    pub fn hop_len(&self) -> usize {
        self.hop
    }

    /// Coefficients produced per frame
    pub fn coeff_count(&self) -> usize {
        self.dct.len()
    }

    /// Number of frames produced for `len` input samples
    pub fn frame_count(&self, len: usize) -> usize {
        len.div_ceil(self.hop)
    }

    /// Coefficients of every frame, concatenated frame by frame
    pub fn compute(&self, samples: &[f32]) -> AudioResult<Vec<f32>> {
        let frames = self.frame_count(samples.len());
        let mut output = Vec::with_capacity(frames * self.coeff_count());

        let mut input = self.plan.make_input_vec();
        let mut spectrum = self.plan.make_output_vec();
        let mut energies = vec![0.0f32; self.filters.len()];

        for frame in 0..frames {
            let start = frame * self.hop;
            input.iter_mut().for_each(|x| *x = 0.0);
            for (i, w) in self.window.iter().enumerate() {
                input[i] = samples.get(start + i).copied().unwrap_or(0.0) * w;
            }

            self.plan
                .process(&mut input, &mut spectrum)
                .map_err(|e| AudioError::ProcessingError(e.to_string()))?;

            for (energy, filter) in energies.iter_mut().zip(&self.filters) {
                let sum: f32 = filter
                    .iter()
                    .zip(&spectrum)
                    .map(|(weight, bin)| weight * power(bin))
                    .sum();
                *energy = (sum + LOG_FLOOR).ln();
            }

            for row in &self.dct {
                output.push(row.iter().zip(&energies).map(|(c, e)| c * e).sum());
            }
        }

        Ok(output)
    }
}

fn power(bin: &Complex32) -> f32 {
    bin.norm_sqr()
}

fn hamming_window(size: usize) -> Vec<f32> {
    if size == 1 {
        return vec![1.0];
    }
    (0..size)
        .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f32 / (size - 1) as f32).cos())
        .collect()
}

fn hz_to_mel(hz: f32) -> f32 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

fn mel_to_hz(mel: f32) -> f32 {
    700.0 * (10f32.powf(mel / 2595.0) - 1.0)
}

/// Triangular filters over the `fft_size / 2 + 1` spectrum bins
fn mel_filters(options: &MfccOptions, sample_rate: u32) -> Vec<Vec<f32>> {
    let bins = options.fft_size / 2 + 1;
    let mel_min = hz_to_mel(options.low_freq);
    let mel_max = hz_to_mel(options.high_freq);
    let edges: Vec<f32> = (0..options.mel_count + 2)
        .map(|i| mel_to_hz(mel_min + (mel_max - mel_min) * i as f32 / (options.mel_count + 1) as f32))
        .collect();
    let bin_hz = sample_rate as f32 / options.fft_size as f32;

    (0..options.mel_count)
        .map(|m| {
            let (left, center, right) = (edges[m], edges[m + 1], edges[m + 2]);
            (0..bins)
                .map(|k| {
                    let f = k as f32 * bin_hz;
                    let rise = (f - left) / (center - left);
                    let fall = (right - f) / (right - center);
                    rise.min(fall).max(0.0)
                })
                .collect()
        })
        .collect()
}

/// DCT-II basis rows for the first `keep` coefficients
fn dct_table(keep: usize, mel_count: usize) -> Vec<Vec<f32>> {
    (0..keep)
        .map(|n| {
            (0..mel_count)
                .map(|m| (PI * n as f32 * (m as f32 + 0.5) / mel_count as f32).cos())
                .collect()
        })
        .collect()
}
