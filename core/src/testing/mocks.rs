//! Mock implementations for testing.
//!
//! Provides in-process stand-ins for the four model graphs so the pipeline
//! can be unit tested without real model files.

use crate::execution::stages::diffusion::{
    INPUT_CURRENT_STEP, INPUT_LATENT_MASK, INPUT_NOISY_LATENT, INPUT_TOTAL_STEP,
    OUTPUT_DENOISED_LATENT,
};
use crate::execution::stages::duration::OUTPUT_DURATION;
use crate::execution::stages::text_encoder::OUTPUT_TEXT_EMB;
use crate::execution::stages::vocoder::{INPUT_LATENT, OUTPUT_WAV};
use crate::execution::TtsModels;
use crate::execution::stages::{diffusion, duration, text_encoder, vocoder};
use crate::runtime_adapter::{AdapterError, AdapterResult, InferenceBackend, Tensor};
use crate::tts::config::EngineConfig;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Channel count of the mock text embedding.
pub const MOCK_TEXT_EMB_CHANNELS: usize = 8;

/// Sample value written by [`vocoder_mock`].
pub const MOCK_SAMPLE: f32 = 0.1;

type Handler = dyn Fn(&[(&str, &Tensor)]) -> AdapterResult<Vec<(String, Tensor)>> + Send + Sync;

/// A mock backend driven by a closure.
///
/// Tracks how many times it was run (failed runs included) and can be told
/// to start failing after a number of successful calls.
///
/// # Example
///
/// ```rust
/// use narrator_core::runtime_adapter::{InferenceBackend, Tensor};
/// use narrator_core::testing::mocks::MockBackend;
///
/// let backend = MockBackend::new("vocoder", |_| {
///     Ok(vec![("wav_tts".to_string(), Tensor::zeros_f32(vec![1, 4]))])
/// });
/// backend.run(&[]).unwrap();
/// assert_eq!(backend.calls(), 1);
/// ```
pub struct MockBackend {
    name: String,
    handler: Box<Handler>,
    calls: Arc<AtomicUsize>,
    fail_after: Arc<AtomicUsize>,
    last_inputs: Arc<Mutex<Vec<String>>>,
    input_names: Vec<String>,
    output_names: Vec<String>,
}

impl MockBackend {
    pub fn new<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&[(&str, &Tensor)]) -> AdapterResult<Vec<(String, Tensor)>> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            handler: Box::new(handler),
            calls: Arc::new(AtomicUsize::new(0)),
            fail_after: Arc::new(AtomicUsize::new(usize::MAX)),
            last_inputs: Arc::new(Mutex::new(Vec::new())),
            input_names: Vec::new(),
            output_names: Vec::new(),
        }
    }

    /// Describe the graph's inputs and outputs the way a loaded model would.
    pub fn with_io_names(mut self, inputs: &[&str], outputs: &[&str]) -> Self {
        self.input_names = inputs.iter().map(|n| n.to_string()).collect();
        self.output_names = outputs.iter().map(|n| n.to_string()).collect();
        self
    }

    /// Number of times `run` was called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Shared handle to the call counter, usable after the backend is boxed.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    /// Let the first `n` calls succeed and fail every call after that.
    pub fn fail_after(&self, n: usize) {
        self.fail_after.store(n, Ordering::SeqCst);
    }

    /// Input names passed to the most recent call, in order.
    pub fn last_input_names(&self) -> Vec<String> {
        self.last_inputs
            .lock()
            .map(|names| names.clone())
            .unwrap_or_default()
    }
}

impl InferenceBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, inputs: &[(&str, &Tensor)]) -> AdapterResult<HashMap<String, Tensor>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut names) = self.last_inputs.lock() {
            *names = inputs.iter().map(|(name, _)| name.to_string()).collect();
        }
        if call >= self.fail_after.load(Ordering::SeqCst) {
            return Err(AdapterError::InferenceFailed(format!(
                "{}: injected failure on call {}",
                self.name,
                call + 1
            )));
        }
        Ok((self.handler)(inputs)?.into_iter().collect())
    }

    fn input_names(&self) -> Vec<String> {
        self.input_names.clone()
    }

    fn output_names(&self) -> Vec<String> {
        self.output_names.clone()
    }
}

fn input<'a>(inputs: &[(&str, &'a Tensor)], name: &str) -> AdapterResult<&'a Tensor> {
    inputs
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, t)| *t)
        .ok_or_else(|| AdapterError::InvalidInput(format!("missing input '{}'", name)))
}

fn batch_of(tensor: &Tensor) -> usize {
    tensor.dim(0).unwrap_or(1)
}

/// Duration predictor returning `durations[i % len]` for its i-th call.
pub fn duration_mock(durations: Vec<f32>) -> MockBackend {
    let durations = if durations.is_empty() {
        vec![1.0]
    } else {
        durations
    };
    let call = AtomicUsize::new(0);
    MockBackend::new("duration_predictor", move |inputs| {
        let batch = batch_of(input(inputs, "text_ids")?);
        let i = call.fetch_add(1, Ordering::SeqCst);
        let value = durations[i % durations.len()];
        let tensor = Tensor::from_f32(vec![batch], vec![value; batch])?;
        Ok(vec![(OUTPUT_DURATION.to_string(), tensor)])
    })
    .with_io_names(duration::INPUTS, &[OUTPUT_DURATION])
}

/// Text encoder returning zeros shaped `[batch, 8, text_len]`.
pub fn text_encoder_mock() -> MockBackend {
    MockBackend::new("text_encoder", |inputs| {
        let ids = input(inputs, "text_ids")?;
        ids.expect_rank("text_ids", 2)?;
        let shape = vec![batch_of(ids), MOCK_TEXT_EMB_CHANNELS, ids.dim(1).unwrap_or(0)];
        Ok(vec![(OUTPUT_TEXT_EMB.to_string(), Tensor::zeros_f32(shape))])
    })
    .with_io_names(text_encoder::INPUTS, &[OUTPUT_TEXT_EMB])
}

/// `(current_step, total_step)` pairs seen by [`vector_estimator_mock`].
#[derive(Debug, Clone, Default)]
pub struct StepRecorder {
    steps: Arc<Mutex<Vec<(f32, f32)>>>,
}

impl StepRecorder {
    pub fn steps(&self) -> Vec<(f32, f32)> {
        self.steps.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn push(&self, current: f32, total: f32) {
        if let Ok(mut steps) = self.steps.lock() {
            steps.push((current, total));
        }
    }
}

/// Vector estimator that checks latent and mask shapes against `config`
/// and returns the noisy latent scaled by one half.
pub fn vector_estimator_mock(config: EngineConfig) -> (MockBackend, StepRecorder) {
    let recorder = StepRecorder::default();
    let seen = recorder.clone();
    let channels = config.latent_channels();

    let backend = MockBackend::new("vector_estimator", move |inputs| {
        let latent = input(inputs, INPUT_NOISY_LATENT)?;
        latent.expect_rank(INPUT_NOISY_LATENT, 3)?;
        let (batch, frames) = (batch_of(latent), latent.dim(2).unwrap_or(0));
        if latent.dim(1) != Some(channels) {
            return Err(AdapterError::ShapeMismatch(format!(
                "noisy_latent {:?} should have {} channels",
                latent.shape(),
                channels
            )));
        }
        let mask = input(inputs, INPUT_LATENT_MASK)?;
        if mask.shape() != [batch, 1, frames] {
            return Err(AdapterError::ShapeMismatch(format!(
                "latent_mask {:?} does not match latent {:?}",
                mask.shape(),
                latent.shape()
            )));
        }

        let current = input(inputs, INPUT_CURRENT_STEP)?.as_f32()?;
        let total = input(inputs, INPUT_TOTAL_STEP)?.as_f32()?;
        if current.len() != batch || total.len() != batch {
            return Err(AdapterError::ShapeMismatch(
                "step tensors must be [batch]".to_string(),
            ));
        }
        seen.push(current[0], total[0]);

        let halved: Vec<f32> = latent.as_f32()?.iter().map(|v| v * 0.5).collect();
        let out = Tensor::from_f32(latent.shape().to_vec(), halved)?;
        Ok(vec![(OUTPUT_DENOISED_LATENT.to_string(), out)])
    })
    .with_io_names(diffusion::INPUTS, &[OUTPUT_DENOISED_LATENT]);
    (backend, recorder)
}

/// Vocoder producing `frames * chunk_size` samples of [`MOCK_SAMPLE`] per row.
pub fn vocoder_mock(config: EngineConfig) -> MockBackend {
    let chunk = config.chunk_size();
    MockBackend::new("vocoder", move |inputs| {
        let latent = input(inputs, INPUT_LATENT)?;
        latent.expect_rank(INPUT_LATENT, 3)?;
        let shape = vec![batch_of(latent), latent.dim(2).unwrap_or(0) * chunk];
        let len = shape.iter().product();
        let wav = Tensor::from_f32(shape, vec![MOCK_SAMPLE; len])?;
        Ok(vec![(OUTPUT_WAV.to_string(), wav)])
    })
    .with_io_names(vocoder::INPUTS, &[OUTPUT_WAV])
}

/// Which of the four graphs a mock stands in for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockStage {
    DurationPredictor,
    TextEncoder,
    VectorEstimator,
    Vocoder,
}

/// Call counters shared with a set of boxed mocks.
#[derive(Debug, Clone)]
pub struct ModelCounters {
    duration_predictor: Arc<AtomicUsize>,
    text_encoder: Arc<AtomicUsize>,
    vector_estimator: Arc<AtomicUsize>,
    vocoder: Arc<AtomicUsize>,
}

impl ModelCounters {
    pub fn calls(&self, stage: MockStage) -> usize {
        let counter = match stage {
            MockStage::DurationPredictor => &self.duration_predictor,
            MockStage::TextEncoder => &self.text_encoder,
            MockStage::VectorEstimator => &self.vector_estimator,
            MockStage::Vocoder => &self.vocoder,
        };
        counter.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        [
            MockStage::DurationPredictor,
            MockStage::TextEncoder,
            MockStage::VectorEstimator,
            MockStage::Vocoder,
        ]
        .iter()
        .map(|&stage| self.calls(stage))
        .sum()
    }
}

/// Builder for a full set of mock graphs.
pub struct MockModels {
    duration_predictor: MockBackend,
    text_encoder: MockBackend,
    vector_estimator: MockBackend,
    vocoder: MockBackend,
    steps: StepRecorder,
}

impl MockModels {
    /// Well-behaved mocks: every unit lasts one second.
    pub fn new(config: EngineConfig) -> Self {
        let (vector_estimator, steps) = vector_estimator_mock(config);
        Self {
            duration_predictor: duration_mock(vec![1.0]),
            text_encoder: text_encoder_mock(),
            vector_estimator,
            vocoder: vocoder_mock(config),
            steps,
        }
    }

    /// Predict `durations` in turn, one value per unit.
    pub fn with_durations(mut self, durations: Vec<f32>) -> Self {
        self.duration_predictor = duration_mock(durations);
        self
    }

    pub fn with_vocoder(mut self, vocoder: MockBackend) -> Self {
        self.vocoder = vocoder;
        self
    }

    /// Make `stage` fail once it has served `n` calls.
    pub fn fail_after(self, stage: MockStage, n: usize) -> Self {
        self.backend(stage).fail_after(n);
        self
    }

    pub fn backend(&self, stage: MockStage) -> &MockBackend {
        match stage {
            MockStage::DurationPredictor => &self.duration_predictor,
            MockStage::TextEncoder => &self.text_encoder,
            MockStage::VectorEstimator => &self.vector_estimator,
            MockStage::Vocoder => &self.vocoder,
        }
    }

    pub fn counters(&self) -> ModelCounters {
        ModelCounters {
            duration_predictor: self.duration_predictor.call_counter(),
            text_encoder: self.text_encoder.call_counter(),
            vector_estimator: self.vector_estimator.call_counter(),
            vocoder: self.vocoder.call_counter(),
        }
    }

    /// Diffusion steps seen by the vector estimator mock.
    pub fn steps(&self) -> StepRecorder {
        self.steps.clone()
    }

    pub fn into_models(self) -> TtsModels {
        TtsModels {
            duration_predictor: Box::new(self.duration_predictor),
            text_encoder: Box::new(self.text_encoder),
            vector_estimator: Box::new(self.vector_estimator),
            vocoder: Box::new(self.vocoder),
        }
    }
}

/// Default mock graphs plus their call counters.
pub fn mock_models(config: EngineConfig) -> (TtsModels, ModelCounters) {
    let mocks = MockModels::new(config);
    let counters = mocks.counters();
    (mocks.into_models(), counters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::test_engine_config;

    #[test]
    fn test_fail_after_counts_failed_calls() {
        let backend = MockBackend::new("m", |_| Ok(vec![]));
        backend.fail_after(1);
        assert!(backend.run(&[]).is_ok());
        assert!(backend.run(&[]).is_err());
        assert!(backend.run(&[]).is_err());
        assert_eq!(backend.calls(), 3);
    }

    #[test]
    fn test_records_input_names() {
        let backend = MockBackend::new("m", |_| Ok(vec![]));
        let t = Tensor::zeros_f32(vec![1]);
        backend.run(&[("a", &t), ("b", &t)]).unwrap();
        assert_eq!(backend.last_input_names(), vec!["a", "b"]);
    }

    #[test]
    fn test_duration_mock_cycles() {
        let backend = duration_mock(vec![1.5, 2.0]);
        let ids = Tensor::zeros_i64(vec![1, 3]);
        let got: Vec<f32> = (0..3)
            .map(|_| {
                let out = backend.run(&[("text_ids", &ids)]).unwrap();
                out[OUTPUT_DURATION].as_f32().unwrap()[0]
            })
            .collect();
        assert_eq!(got, vec![1.5, 2.0, 1.5]);
    }

    #[test]
    fn test_counters_follow_boxed_models() {
        let (models, counters) = mock_models(test_engine_config());
        let latent = Tensor::zeros_f32(vec![1, 8, 3]);
        models.vocoder.run(&[(INPUT_LATENT, &latent)]).unwrap();
        assert_eq!(counters.calls(MockStage::Vocoder), 1);
        assert_eq!(counters.total(), 1);
    }

    #[test]
    fn test_vocoder_mock_length() {
        let config = test_engine_config();
        let latent = Tensor::zeros_f32(vec![1, 8, 3]);
        let out = vocoder_mock(config).run(&[(INPUT_LATENT, &latent)]).unwrap();
        assert_eq!(out[OUTPUT_WAV].shape(), &[1, 3 * config.chunk_size()]);
    }
}
