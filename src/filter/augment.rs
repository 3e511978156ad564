use crate::core::AudioFrame;
use crate::error::{AudioError, AudioResult};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::ops::RangeInclusive;

/// Ranges the random perturbations are drawn from
#[derive(Debug, Clone)]
pub struct AugmentOptions {
    /// Playback speed factor; 1.1 means 10% faster and shorter
    pub speed: RangeInclusive<f32>,
    /// Linear gain factor
    pub gain: RangeInclusive<f32>,
    /// Peak amplitude of additive white noise
    pub noise: RangeInclusive<f32>,
}

impl Default for AugmentOptions {
    fn default() -> Self {
        AugmentOptions {
            speed: 0.9..=1.1,
            gain: 0.5..=1.5,
            noise: 0.0..=0.005,
        }
    }
}

/// Random waveform augmentation: speed change, gain, white noise
pub struct Augment {
    options: AugmentOptions,
    rng: StdRng,
}

impl Augment {
    /// Create an augmenter that draws from `rng`
    pub fn new(options: AugmentOptions, rng: StdRng) -> AudioResult<Self> {
        let ok = |r: &RangeInclusive<f32>| r.start().is_finite() && r.end().is_finite() && r.start() <= r.end();
        if !ok(&options.speed) || *options.speed.start() <= 0.0 {
            return Err(AudioError::ConfigError(
                "speed range must be positive and ordered".to_string(),
            ));
        }
        if !ok(&options.gain) || !ok(&options.noise) || *options.noise.start() < 0.0 {
            return Err(AudioError::ConfigError(
                "gain and noise ranges must be ordered and non-negative".to_string(),
            ));
        }
        Ok(Augment { options, rng })
    }

    /// Augmenter with default ranges and a seeded generator
    pub fn from_seed(seed: u64) -> Self {
        Augment {
            options: AugmentOptions::default(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Augment a waveform
    pub fn apply(&mut self, data: &[f32]) -> Vec<f32> {
        let speed = self.rng.gen_range(self.options.speed.clone());
        let gain = self.rng.gen_range(self.options.gain.clone());
        let noise = self.rng.gen_range(self.options.noise.clone());

        let mut out = linear_resample(data, speed as f64);
        for sample in out.iter_mut() {
            let jitter = if noise > 0.0 {
                self.rng.gen_range(-noise..=noise)
            } else {
                0.0
            };
            *sample = (*sample * gain + jitter).clamp(-1.0, 1.0);
        }
        out
    }
}

/// Linear interpolation resampling; `ratio` > 1 shortens the signal
fn linear_resample(input: &[f32], ratio: f64) -> Vec<f32> {
    if input.is_empty() || ratio <= 0.0 {
        return Vec::new();
    }

    let output_len = ((input.len() as f64 / ratio).round() as usize).max(1);
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let input_pos = i as f64 * ratio;
        let input_idx = input_pos.floor() as usize;

        if input_idx + 1 < input.len() {
            let frac = input_pos - input_idx as f64;
            let sample = input[input_idx] as f64 * (1.0 - frac) + input[input_idx + 1] as f64 * frac;
            output.push(sample as f32);
        } else {
            output.push(input[input.len() - 1]);
        }
    }

    output
}

impl super::Filter for Augment {
    fn process(&mut self, frame: &AudioFrame) -> AudioResult<AudioFrame> {
        let augmented = self.apply(frame.samples());
        frame.with_samples(augmented, frame.sample_rate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_resample_identity() {
        let input = vec![0.0, 0.5, 1.0];
        assert_eq!(linear_resample(&input, 1.0), input);
    }

    #[test]
    fn test_linear_resample_interpolates() {
        let output = linear_resample(&[0.0, 1.0, 0.0, -1.0], 0.5);
        assert_eq!(output.len(), 8);
        assert!((output[1] - 0.5).abs() < 1e-6);
        assert!((output[5] + 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_output_stays_in_range() {
        let mut augment = Augment::from_seed(7);
        let data: Vec<f32> = (0..2000).map(|i| if i % 2 == 0 { 0.99 } else { -0.99 }).collect();
        for _ in 0..10 {
            let out = augment.apply(&data);
            assert!(out.len() >= 1800 && out.len() <= 2223, "len {}", out.len());
            assert!(out.iter().all(|x| (-1.0..=1.0).contains(x)));
        }
    }

    #[test]
    fn test_seeded_runs_repeat() {
        let data: Vec<f32> = (0..500).map(|i| (i as f32 * 0.01).sin()).collect();
        let a = Augment::from_seed(42).apply(&data);
        let b = Augment::from_seed(42).apply(&data);
        assert_eq!(a, b);
    }

    #[test]
    fn test_fixed_ranges() {
        let options = AugmentOptions {
            speed: 1.0..=1.0,
            gain: 2.0..=2.0,
            noise: 0.0..=0.0,
        };
        let mut augment = Augment::new(options, StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(augment.apply(&[0.1, -0.25, 0.75]), vec![0.2, -0.5, 1.0]);
    }

    #[test]
    fn test_invalid_ranges() {
        let options = AugmentOptions {
            speed: 0.0..=1.0,
            ..AugmentOptions::default()
        };
        assert!(Augment::new(options, StdRng::seed_from_u64(1)).is_err());
    }

    #[test]
    fn test_empty_input() {
        assert!(Augment::from_seed(3).apply(&[]).is_empty());
    }
}
