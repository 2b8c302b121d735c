//! Execution module - Model stages of the synthesis pipeline.
//!
//! ## Module Organization
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`stages`] | Duration, text encoder, diffusion and vocoder glue |
//! | [`noise`] | Gaussian latent noise and latent shape math |
//!
//! ## Execution Flow (per unit)
//!
//! ```text
//! EncodedText + VoiceStyle
//!     │
//!     ├── duration_predictor ──► seconds / speed
//!     ├── text_encoder ────────► text_emb
//!     ├── vector_estimator ×N ─► denoised latent
//!     └── vocoder ─────────────► samples
//! ```

pub mod noise;
pub mod stages;

pub use noise::{GaussianNoise, LatentLayout};
pub use stages::diffusion::{DiffusionInputs, DiffusionSampler};

use crate::runtime_adapter::{ExecutionProviderKind, InferenceBackend, OnnxBackend};
use crate::tts::error::TtsError;
use std::path::Path;

pub const DURATION_PREDICTOR_FILE: &str = "duration_predictor.onnx";
pub const TEXT_ENCODER_FILE: &str = "text_encoder.onnx";
pub const VECTOR_ESTIMATOR_FILE: &str = "vector_estimator.onnx";
pub const VOCODER_FILE: &str = "vocoder.onnx";

/// The four model graphs the pipeline drives.
///
/// Owned by one engine and reused read-only across requests.
pub struct TtsModels {
    pub duration_predictor: Box<dyn InferenceBackend>,
    pub text_encoder: Box<dyn InferenceBackend>,
    pub vector_estimator: Box<dyn InferenceBackend>,
    pub vocoder: Box<dyn InferenceBackend>,
}

impl TtsModels {
    /// Load all four ONNX graphs from `model_dir`.
    pub fn load_onnx(
        model_dir: impl AsRef<Path>,
        provider: ExecutionProviderKind,
    ) -> Result<Self, TtsError> {
        let dir = model_dir.as_ref();
        let load = |file: &str| -> Result<Box<dyn InferenceBackend>, TtsError> {
            let backend = OnnxBackend::load_with_provider(dir.join(file), provider).map_err(|e| {
                TtsError::Initialization(format!("failed to load {}: {}", file, e))
            })?;
            Ok(Box::new(backend))
        };

        let models = Self {
            duration_predictor: load(DURATION_PREDICTOR_FILE)?,
            text_encoder: load(TEXT_ENCODER_FILE)?,
            vector_estimator: load(VECTOR_ESTIMATOR_FILE)?,
            vocoder: load(VOCODER_FILE)?,
        };
        models.check_bindings()?;
        Ok(models)
    }

    /// Verify each graph declares every input its stage binds and the output
    /// it reads back.
    pub fn check_bindings(&self) -> Result<(), TtsError> {
        check_graph(
            self.duration_predictor.as_ref(),
            stages::duration::INPUTS,
            stages::duration::OUTPUT_DURATION,
        )?;
        check_graph(
            self.text_encoder.as_ref(),
            stages::text_encoder::INPUTS,
            stages::text_encoder::OUTPUT_TEXT_EMB,
        )?;
        check_graph(
            self.vector_estimator.as_ref(),
            stages::diffusion::INPUTS,
            stages::diffusion::OUTPUT_DENOISED_LATENT,
        )?;
        check_graph(
            self.vocoder.as_ref(),
            stages::vocoder::INPUTS,
            stages::vocoder::OUTPUT_WAV,
        )
    }
}

fn check_graph(
    backend: &dyn InferenceBackend,
    inputs: &[&str],
    output: &str,
) -> Result<(), TtsError> {
    let declared = backend.input_names();
    let missing: Vec<&str> = inputs
        .iter()
        .copied()
        .filter(|name| !declared.iter().any(|d| d == name))
        .collect();
    if !missing.is_empty() {
        return Err(TtsError::Initialization(format!(
            "{} is missing input(s) {:?}; graph declares {:?}",
            backend.name(),
            missing,
            declared
        )));
    }
    if !backend.output_names().iter().any(|o| o == output) {
        return Err(TtsError::Initialization(format!(
            "{} does not produce output '{}'",
            backend.name(),
            output
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::test_engine_config;
    use crate::testing::mocks::{mock_models, MockBackend};

    #[test]
    fn test_mock_graphs_satisfy_bindings() {
        let (models, _) = mock_models(test_engine_config());
        models.check_bindings().unwrap();
    }

    #[test]
    fn test_missing_input_rejected() {
        let (mut models, counters) = mock_models(test_engine_config());
        models.duration_predictor = Box::new(
            MockBackend::new("duration_predictor", |_| Ok(vec![]))
                .with_io_names(&["text_ids", "style_dp"], &["duration"]),
        );
        let err = models.check_bindings().unwrap_err();
        match err {
            TtsError::Initialization(msg) => {
                assert!(msg.contains("duration_predictor"), "{}", msg);
                assert!(msg.contains("text_mask"), "{}", msg);
            }
            other => panic!("expected Initialization, got {:?}", other),
        }
        assert_eq!(counters.total(), 0);
    }

    #[test]
    fn test_missing_output_rejected() {
        let (mut models, _) = mock_models(test_engine_config());
        models.vocoder = Box::new(
            MockBackend::new("vocoder", |_| Ok(vec![])).with_io_names(&["latent"], &["audio"]),
        );
        assert!(matches!(
            models.check_bindings(),
            Err(TtsError::Initialization(_))
        ));
    }

    #[test]
    fn test_extra_graph_inputs_allowed() {
        let graph = MockBackend::new("vocoder", |_| Ok(vec![]))
            .with_io_names(&["latent", "speaker"], &["wav_tts"]);
        check_graph(&graph, stages::vocoder::INPUTS, stages::vocoder::OUTPUT_WAV).unwrap();
    }

    #[test]
    fn test_undescribed_graph_rejected() {
        let graph = MockBackend::new("vocoder", |_| Ok(vec![]));
        assert!(check_graph(&graph, stages::vocoder::INPUTS, stages::vocoder::OUTPUT_WAV).is_err());
    }
}
