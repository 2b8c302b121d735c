//! Duration predictor stage.

use super::run_for_output;
use crate::preprocessing::EncodedText;
use crate::runtime_adapter::{InferenceBackend, Tensor};
use crate::tts::error::TtsError;

pub const INPUT_TEXT_IDS: &str = "text_ids";
pub const INPUT_STYLE_DP: &str = "style_dp";
pub const INPUT_TEXT_MASK: &str = "text_mask";
pub const OUTPUT_DURATION: &str = "duration";

/// Every input the stage binds, in binding order.
pub const INPUTS: &[&str] = &[INPUT_TEXT_IDS, INPUT_STYLE_DP, INPUT_TEXT_MASK];

/// Predict seconds of speech per batch row, scaled by `1 / speed`.
///
/// Every value must come back finite and positive.
pub fn predict_durations(
    backend: &dyn InferenceBackend,
    text: &EncodedText,
    style_dp: &Tensor,
    speed: f32,
) -> Result<Vec<f32>, TtsError> {
    let batch = text.lengths.len();
    let output = run_for_output(
        backend,
        &[
            (INPUT_TEXT_IDS, &text.ids),
            (INPUT_STYLE_DP, style_dp),
            (INPUT_TEXT_MASK, &text.mask),
        ],
        OUTPUT_DURATION,
    )?;

    let raw = output
        .as_f32()
        .map_err(|e| TtsError::Inference(format!("duration output: {}", e)))?;
    if raw.len() != batch {
        return Err(TtsError::Inference(format!(
            "expected {} duration value(s), got shape {:?}",
            batch,
            output.shape()
        )));
    }

    let durations: Vec<f32> = raw.iter().map(|d| d / speed).collect();
    if let Some(bad) = durations.iter().find(|d| !d.is_finite() || **d <= 0.0) {
        return Err(TtsError::Inference(format!(
            "duration predictor returned unusable duration {}",
            bad
        )));
    }

    log::debug!(target: "narrator_core", "predicted durations {:?} (speed {})", durations, speed);
    Ok(durations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::test_indexer;
    use crate::testing::mocks::MockBackend;

    fn style_dp() -> Tensor {
        Tensor::zeros_f32(vec![1, 2, 2])
    }

    fn fixed(values: Vec<f32>) -> MockBackend {
        MockBackend::new("duration_predictor", move |_| {
            let tensor = Tensor::from_f32(vec![values.len()], values.clone())?;
            Ok(vec![(OUTPUT_DURATION.to_string(), tensor)])
        })
    }

    #[test]
    fn test_divides_by_speed() {
        let text = test_indexer().encode(&["Hi."]).unwrap();
        let durations = predict_durations(&fixed(vec![2.0]), &text, &style_dp(), 2.0).unwrap();
        assert_eq!(durations, vec![1.0]);
    }

    #[test]
    fn test_binds_fixed_input_names() {
        let backend = fixed(vec![1.0]);
        let text = test_indexer().encode(&["Hi."]).unwrap();
        predict_durations(&backend, &text, &style_dp(), 1.0).unwrap();
        assert_eq!(
            backend.last_input_names(),
            vec![INPUT_TEXT_IDS, INPUT_STYLE_DP, INPUT_TEXT_MASK]
        );
    }

    #[test]
    fn test_rejects_non_positive() {
        let text = test_indexer().encode(&["Hi."]).unwrap();
        for bad in [0.0, -1.0, f32::NAN] {
            let err = predict_durations(&fixed(vec![bad]), &text, &style_dp(), 1.0).unwrap_err();
            assert!(matches!(err, TtsError::Inference(_)));
        }
    }

    #[test]
    fn test_missing_output() {
        let backend = MockBackend::new("duration_predictor", |_| Ok(vec![]));
        let text = test_indexer().encode(&["Hi."]).unwrap();
        let err = predict_durations(&backend, &text, &style_dp(), 1.0).unwrap_err();
        assert!(matches!(err, TtsError::Inference(ref m) if m.contains("duration")));
    }

    #[test]
    fn test_wrong_count() {
        let text = test_indexer().encode(&["Hi."]).unwrap();
        let err = predict_durations(&fixed(vec![1.0, 2.0]), &text, &style_dp(), 1.0).unwrap_err();
        assert!(matches!(err, TtsError::Inference(_)));
    }
}
