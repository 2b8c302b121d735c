//! Vocoder stage.

use super::run_for_output;
use crate::runtime_adapter::{InferenceBackend, Tensor};
use crate::tts::error::TtsError;

pub const INPUT_LATENT: &str = "latent";
pub const OUTPUT_WAV: &str = "wav_tts";

pub const INPUTS: &[&str] = &[INPUT_LATENT];

/// Decode the final latent into waveform samples, flattened to one dimension.
pub fn vocode(backend: &dyn InferenceBackend, latent: &Tensor) -> Result<Vec<f32>, TtsError> {
    let wav = run_for_output(backend, &[(INPUT_LATENT, latent)], OUTPUT_WAV)?;
    log::debug!(target: "narrator_core", "wav_tts shape {:?}", wav.shape());
    wav.into_f32()
        .map_err(|e| TtsError::Inference(format!("vocoder output: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::mocks::MockBackend;

    #[test]
    fn test_flattens_output() {
        let backend = MockBackend::new("vocoder", |_| {
            let wav = Tensor::from_f32(vec![1, 1, 4], vec![0.1, 0.2, 0.3, 0.4])?;
            Ok(vec![(OUTPUT_WAV.to_string(), wav)])
        });
        let samples = vocode(&backend, &Tensor::zeros_f32(vec![1, 8, 2])).unwrap();
        assert_eq!(samples, vec![0.1, 0.2, 0.3, 0.4]);
    }

    #[test]
    fn test_rejects_integer_output() {
        let backend = MockBackend::new("vocoder", |_| {
            Ok(vec![(OUTPUT_WAV.to_string(), Tensor::zeros_i64(vec![1, 4]))])
        });
        let err = vocode(&backend, &Tensor::zeros_f32(vec![1, 8, 2])).unwrap_err();
        assert!(matches!(err, TtsError::Inference(_)));
    }
}
