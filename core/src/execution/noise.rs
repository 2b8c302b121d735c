//! Gaussian latent noise and latent shape bookkeeping.
//!
//! Standard-normal samples come from a Box-Muller transform over two uniform
//! draws. The first draw is floored at `MIN_UNIFORM` so `ln(u1)` stays finite.

use crate::preprocessing::length_to_mask;
use crate::runtime_adapter::Tensor;
use crate::tts::config::EngineConfig;
use crate::tts::error::TtsError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const MIN_UNIFORM: f32 = 1e-10;

/// Standard-normal sampler.
pub struct GaussianNoise {
    rng: StdRng,
}

impl GaussianNoise {
    /// Seeded sampler when `seed` is given, entropy-seeded otherwise.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    pub fn sample(&mut self) -> f32 {
        let u1: f32 = self.rng.gen::<f32>().max(MIN_UNIFORM);
        let u2: f32 = self.rng.gen::<f32>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * std::f32::consts::PI * u2).cos()
    }

    pub fn fill(&mut self, out: &mut [f32]) {
        for v in out.iter_mut() {
            *v = self.sample();
        }
    }
}

/// Latent time layout for a batch of predicted durations.
#[derive(Debug, Clone, PartialEq)]
pub struct LatentLayout {
    /// Waveform samples per row, `round(duration * sample_rate)`.
    pub wav_lengths: Vec<usize>,
    /// Valid latent frames per row.
    pub latent_lengths: Vec<usize>,
    /// Latent frames in the padded batch tensor.
    pub latent_len: usize,
    /// Latent channel count.
    pub channels: usize,
}

impl LatentLayout {
    /// Derive the layout; every row gets at least one latent frame.
    pub fn from_durations(durations: &[f32], config: &EngineConfig) -> Self {
        let sample_rate = config.sample_rate() as f64;
        let chunk = config.chunk_size();

        let wav_lengths: Vec<usize> = durations
            .iter()
            .map(|&d| (d as f64 * sample_rate).round().max(0.0) as usize)
            .collect();
        let latent_lengths: Vec<usize> = wav_lengths
            .iter()
            .map(|&len| len.div_ceil(chunk).max(1))
            .collect();
        let latent_len = latent_lengths.iter().copied().max().unwrap_or(1);

        Self {
            wav_lengths,
            latent_lengths,
            latent_len,
            channels: config.latent_channels(),
        }
    }

    pub fn shape(&self) -> [usize; 3] {
        [self.latent_lengths.len(), self.channels, self.latent_len]
    }

    /// `[batch, 1, latent_len]` validity mask.
    pub fn mask(&self) -> Tensor {
        length_to_mask(&self.latent_lengths, self.latent_len)
    }
}

/// Draw masked initial noise for the diffusion sampler.
///
/// Returns `(noisy_latent, latent_mask)`; padded frames of the latent are zero.
pub fn sample_noisy_latent(
    layout: &LatentLayout,
    noise: &mut GaussianNoise,
) -> Result<(Tensor, Tensor), TtsError> {
    let mut latent = Tensor::zeros_f32(layout.shape().to_vec());
    noise.fill(latent.as_f32_mut()?);

    let mask = layout.mask();
    {
        let mut view = latent.view_f32_mut()?;
        view *= &mask.view_f32()?;
    }
    Ok((latent, mask))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tts::config::{AutoencoderConfig, TextToLatentConfig};

    fn config() -> EngineConfig {
        EngineConfig {
            ae: AutoencoderConfig {
                sample_rate: 1000,
                base_chunk_size: 10,
            },
            ttl: TextToLatentConfig {
                chunk_compress_factor: 2,
                latent_dim: 4,
            },
        }
    }

    #[test]
    fn test_layout_shape_math() {
        // 1.0s -> 1000 samples -> ceil(1000 / 20) = 50 frames
        // 0.41s -> 410 samples -> ceil(410 / 20) = 21 frames
        let layout = LatentLayout::from_durations(&[1.0, 0.41], &config());
        assert_eq!(layout.wav_lengths, vec![1000, 410]);
        assert_eq!(layout.latent_lengths, vec![50, 21]);
        assert_eq!(layout.latent_len, 50);
        assert_eq!(layout.shape(), [2, 8, 50]);
    }

    #[test]
    fn test_layout_never_zero_length() {
        let layout = LatentLayout::from_durations(&[0.0001], &config());
        assert_eq!(layout.latent_len, 1);
        assert_eq!(layout.latent_lengths, vec![1]);
    }

    #[test]
    fn test_noise_is_masked() {
        let layout = LatentLayout::from_durations(&[1.0, 0.41], &config());
        let mut noise = GaussianNoise::new(Some(3));
        let (latent, mask) = sample_noisy_latent(&layout, &mut noise).unwrap();

        assert_eq!(latent.shape(), &[2, 8, 50]);
        assert_eq!(mask.shape(), &[2, 1, 50]);
        let view = latent.view_f32().unwrap();
        for c in 0..8 {
            for t in 21..50 {
                assert_eq!(view[[1, c, t]], 0.0);
            }
        }
        assert!(view.iter().take(50).any(|&v| v != 0.0));
    }

    #[test]
    fn test_seeded_noise_reproducible() {
        let mut a = GaussianNoise::new(Some(42));
        let mut b = GaussianNoise::new(Some(42));
        let xs: Vec<f32> = (0..16).map(|_| a.sample()).collect();
        let ys: Vec<f32> = (0..16).map(|_| b.sample()).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn test_noise_roughly_standard_normal() {
        let mut noise = GaussianNoise::new(Some(7));
        let n = 20_000;
        let samples: Vec<f32> = (0..n).map(|_| noise.sample()).collect();
        assert!(samples.iter().all(|v| v.is_finite()));
        let mean = samples.iter().sum::<f32>() / n as f32;
        let var = samples.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / n as f32;
        assert!(mean.abs() < 0.05, "mean {}", mean);
        assert!((var - 1.0).abs() < 0.1, "var {}", var);
    }
}
