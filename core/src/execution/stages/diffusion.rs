//! Diffusion sampler: iterative masked denoising with the vector estimator.
//!
//! ```text
//! durations ──► LatentLayout ──► masked noise ──► step 0 ──► step 1 ──► ... ──► step N-1 ──► latent
//!                                                   ▲ text_emb, style_ttl, masks, step indices
//! ```
//!
//! The loop always runs `total_step` iterations. Each iteration replaces the
//! latent wholesale with the estimator's `denoised_latent` output.

use super::run_for_output;
use crate::execution::noise::{sample_noisy_latent, GaussianNoise, LatentLayout};
use crate::runtime_adapter::{InferenceBackend, Tensor};
use crate::tts::config::EngineConfig;
use crate::tts::error::TtsError;

pub const INPUT_NOISY_LATENT: &str = "noisy_latent";
pub const INPUT_TEXT_EMB: &str = "text_emb";
pub const INPUT_STYLE_TTL: &str = "style_ttl";
pub const INPUT_LATENT_MASK: &str = "latent_mask";
pub const INPUT_TEXT_MASK: &str = "text_mask";
pub const INPUT_CURRENT_STEP: &str = "current_step";
pub const INPUT_TOTAL_STEP: &str = "total_step";
pub const OUTPUT_DENOISED_LATENT: &str = "denoised_latent";

pub const INPUTS: &[&str] = &[
    INPUT_NOISY_LATENT,
    INPUT_TEXT_EMB,
    INPUT_STYLE_TTL,
    INPUT_LATENT_MASK,
    INPUT_TEXT_MASK,
    INPUT_CURRENT_STEP,
    INPUT_TOTAL_STEP,
];

/// Conditioning shared by every denoising step of one batch.
pub struct DiffusionInputs<'a> {
    pub text_emb: &'a Tensor,
    pub style_ttl: &'a Tensor,
    pub text_mask: &'a Tensor,
}

/// Runs the fixed-length denoising loop.
#[derive(Debug, Clone)]
pub struct DiffusionSampler {
    config: EngineConfig,
    total_step: usize,
}

impl DiffusionSampler {
    pub fn new(config: EngineConfig, total_step: usize) -> Self {
        Self { config, total_step }
    }

    pub fn total_step(&self) -> usize {
        self.total_step
    }

    /// Draw noise sized for `durations` and denoise it.
    pub fn sample(
        &self,
        estimator: &dyn InferenceBackend,
        inputs: &DiffusionInputs<'_>,
        durations: &[f32],
        noise: &mut GaussianNoise,
    ) -> Result<Tensor, TtsError> {
        let layout = LatentLayout::from_durations(durations, &self.config);
        let (latent, latent_mask) = sample_noisy_latent(&layout, noise)?;
        log::debug!(
            target: "narrator_core",
            "diffusion latent {:?}, valid frames {:?}",
            latent.shape(),
            layout.latent_lengths
        );
        self.denoise(estimator, inputs, latent, &latent_mask)
    }

    /// Run every step starting from an explicit latent.
    pub fn denoise(
        &self,
        estimator: &dyn InferenceBackend,
        inputs: &DiffusionInputs<'_>,
        mut latent: Tensor,
        latent_mask: &Tensor,
    ) -> Result<Tensor, TtsError> {
        latent.expect_rank(INPUT_NOISY_LATENT, 3)?;
        let batch = latent.dim(0).unwrap_or(0);
        if latent_mask.shape() != [batch, 1, latent.dim(2).unwrap_or(0)] {
            return Err(TtsError::ShapeMismatch(format!(
                "latent_mask {:?} does not match latent {:?}",
                latent_mask.shape(),
                latent.shape()
            )));
        }

        let total = Tensor::filled_f32(vec![batch], self.total_step as f32);
        for step in 0..self.total_step {
            let current = Tensor::filled_f32(vec![batch], step as f32);
            let denoised = run_for_output(
                estimator,
                &[
                    (INPUT_NOISY_LATENT, &latent),
                    (INPUT_TEXT_EMB, inputs.text_emb),
                    (INPUT_STYLE_TTL, inputs.style_ttl),
                    (INPUT_LATENT_MASK, latent_mask),
                    (INPUT_TEXT_MASK, inputs.text_mask),
                    (INPUT_CURRENT_STEP, &current),
                    (INPUT_TOTAL_STEP, &total),
                ],
                OUTPUT_DENOISED_LATENT,
            )?;

            if denoised.shape() != latent.shape() {
                return Err(TtsError::ShapeMismatch(format!(
                    "step {}: denoised_latent {:?} does not match latent {:?}",
                    step,
                    denoised.shape(),
                    latent.shape()
                )));
            }
            latent = denoised;
            log::debug!(target: "narrator_core", "diffusion step {}/{}", step + 1, self.total_step);
        }
        Ok(latent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::test_engine_config;
    use crate::testing::mocks::{vector_estimator_mock, MockBackend};

    fn conditioning() -> (Tensor, Tensor, Tensor) {
        (
            Tensor::zeros_f32(vec![1, 8, 5]),
            Tensor::zeros_f32(vec![1, 2, 3]),
            Tensor::filled_f32(vec![1, 1, 5], 1.0),
        )
    }

    #[test]
    fn test_runs_exactly_total_step_times() {
        let (text_emb, style_ttl, text_mask) = conditioning();
        let inputs = DiffusionInputs {
            text_emb: &text_emb,
            style_ttl: &style_ttl,
            text_mask: &text_mask,
        };
        let config = test_engine_config();
        for total_step in [1, 3, 8] {
            for duration in [0.05, 1.0, 4.2] {
                let (estimator, recorder) = vector_estimator_mock(config);
                let sampler = DiffusionSampler::new(config, total_step);
                let mut noise = GaussianNoise::new(Some(1));
                sampler
                    .sample(&estimator, &inputs, &[duration], &mut noise)
                    .unwrap();
                assert_eq!(estimator.calls(), total_step);
                assert_eq!(
                    recorder.steps(),
                    (0..total_step)
                        .map(|s| (s as f32, total_step as f32))
                        .collect::<Vec<_>>()
                );
            }
        }
    }

    #[test]
    fn test_latent_replaced_each_step() {
        let (text_emb, style_ttl, text_mask) = conditioning();
        let inputs = DiffusionInputs {
            text_emb: &text_emb,
            style_ttl: &style_ttl,
            text_mask: &text_mask,
        };
        let (estimator, _) = vector_estimator_mock(test_engine_config());
        let sampler = DiffusionSampler::new(test_engine_config(), 3);
        let latent = Tensor::filled_f32(vec![1, 8, 2], 8.0);
        let mask = Tensor::filled_f32(vec![1, 1, 2], 1.0);

        // the mock halves its input: 8 -> 4 -> 2 -> 1
        let out = sampler.denoise(&estimator, &inputs, latent, &mask).unwrap();
        assert!(out.as_f32().unwrap().iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_shape_change_is_fatal() {
        let (text_emb, style_ttl, text_mask) = conditioning();
        let inputs = DiffusionInputs {
            text_emb: &text_emb,
            style_ttl: &style_ttl,
            text_mask: &text_mask,
        };
        let estimator = MockBackend::new("vector_estimator", |_| {
            Ok(vec![(
                OUTPUT_DENOISED_LATENT.to_string(),
                Tensor::zeros_f32(vec![1, 8, 7]),
            )])
        });
        let sampler = DiffusionSampler::new(test_engine_config(), 8);
        let err = sampler
            .denoise(
                &estimator,
                &inputs,
                Tensor::zeros_f32(vec![1, 8, 2]),
                &Tensor::filled_f32(vec![1, 1, 2], 1.0),
            )
            .unwrap_err();
        assert!(matches!(err, TtsError::ShapeMismatch(_)));
        // aborted on the first step
        assert_eq!(estimator.calls(), 1);
    }

    #[test]
    fn test_estimator_failure_aborts() {
        let (text_emb, style_ttl, text_mask) = conditioning();
        let inputs = DiffusionInputs {
            text_emb: &text_emb,
            style_ttl: &style_ttl,
            text_mask: &text_mask,
        };
        let (estimator, _) = vector_estimator_mock(test_engine_config());
        estimator.fail_after(2);
        let sampler = DiffusionSampler::new(test_engine_config(), 8);
        let mut noise = GaussianNoise::new(Some(1));
        let err = sampler
            .sample(&estimator, &inputs, &[1.0], &mut noise)
            .unwrap_err();
        assert!(matches!(err, TtsError::Inference(_)));
        assert_eq!(estimator.calls(), 3);
    }
}
