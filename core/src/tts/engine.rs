//! TTS engine implementation.

use super::config::{EngineConfig, TtsConfig};
use super::error::TtsError;
use super::request::GenerationRequest;
use super::response::TtsResult;
use super::timeline::Timeline;
use super::voice_style::VoiceStyleLoader;
use crate::execution::stages::{encode_text, predict_durations, vocode};
use crate::execution::{DiffusionInputs, DiffusionSampler, GaussianNoise, TtsModels};
use crate::preprocessing::{chunk_text, is_synthesizable, normalize_paragraphs, UnicodeIndexer};
use crate::tracing::{SpanCollector, SpanGuard};
use std::path::PathBuf;
use std::time::Instant;

/// Progress notifications, emitted in unit order.
#[derive(Debug, Clone, PartialEq)]
pub enum SynthesisProgress {
    /// Text has been normalized and split.
    Segmented { total_units: usize },
    /// Unit `index` (0-based) finished with the given duration in seconds.
    UnitComplete {
        index: usize,
        total: usize,
        duration: f64,
    },
}

/// Text-to-Speech engine running the full pipeline for one request at a time.
///
/// ## Example
///
/// ```rust,no_run
/// use narrator_core::tts::{GenerationRequest, Tts, TtsConfig};
///
/// let tts = Tts::from_dir(TtsConfig::new("assets/onnx"))?;
/// let result = tts.synthesize(
///     &GenerationRequest::new("Hello, world!", "F1")
///         .with_speed(1.05)
///         .with_silence(0.3),
/// )?;
/// result.save_wav("output.wav")?;
/// result.save_srt("output.srt")?;
/// # Ok::<(), narrator_core::tts::TtsError>(())
/// ```
pub struct Tts {
    config: TtsConfig,
    engine_config: EngineConfig,
    indexer: UnicodeIndexer,
    voices: VoiceStyleLoader,
    models: TtsModels,
    sampler: DiffusionSampler,
}

impl Tts {
    /// Create an engine from a model directory with default configuration.
    pub fn new(model_dir: impl Into<PathBuf>) -> Result<Self, TtsError> {
        Self::from_dir(TtsConfig::new(model_dir))
    }

    /// Load config, indexer and the four ONNX graphs named by `config`.
    pub fn from_dir(config: TtsConfig) -> Result<Self, TtsError> {
        config.validate()?;
        if !config.model_dir.is_dir() {
            return Err(TtsError::Initialization(format!(
                "model directory not found: {}",
                config.model_dir.display()
            )));
        }

        let engine_config = EngineConfig::load(config.engine_config_path())?;
        let indexer = UnicodeIndexer::from_file(&config.indexer_file)?;
        let models = TtsModels::load_onnx(&config.model_dir, config.execution_provider)?;

        log::info!(
            target: "narrator_core",
            "Loaded TTS engine from {} ({} Hz, {} steps, {} provider)",
            config.model_dir.display(),
            engine_config.sample_rate(),
            config.total_step,
            config.execution_provider
        );

        Self::with_models(config, engine_config, indexer, models)
    }

    /// Assemble an engine from already-loaded parts.
    pub fn with_models(
        config: TtsConfig,
        engine_config: EngineConfig,
        indexer: UnicodeIndexer,
        models: TtsModels,
    ) -> Result<Self, TtsError> {
        config.validate()?;
        engine_config.validate()?;
        let voices = VoiceStyleLoader::new(config.voice_dir.clone());
        let sampler = DiffusionSampler::new(engine_config, config.total_step);
        Ok(Self {
            config,
            engine_config,
            indexer,
            voices,
            models,
            sampler,
        })
    }

    pub fn config(&self) -> &TtsConfig {
        &self.config
    }

    pub fn engine_config(&self) -> &EngineConfig {
        &self.engine_config
    }

    pub fn sample_rate(&self) -> u32 {
        self.engine_config.sample_rate()
    }

    /// Voice loader and cache owned by this engine.
    pub fn voices(&self) -> &VoiceStyleLoader {
        &self.voices
    }

    /// Normalize and split text the way `synthesize` would.
    ///
    /// Units without anything voiceable are dropped.
    pub fn segment(&self, text: &str, max_chunk_length: Option<usize>) -> Vec<String> {
        let max_len = max_chunk_length.unwrap_or(self.config.max_chunk_length);
        let normalized = normalize_paragraphs(text);
        chunk_text(&normalized, max_len)
            .into_iter()
            .filter(|unit| is_synthesizable(unit))
            .collect()
    }

    /// Synthesize a request.
    pub fn synthesize(&self, request: &GenerationRequest) -> Result<TtsResult, TtsError> {
        self.synthesize_with_progress(request, &mut |_| {})
    }

    /// Synthesize a request, reporting progress after segmentation and after
    /// each unit.
    ///
    /// Any failure aborts the whole request; audio from earlier units is
    /// discarded.
    pub fn synthesize_with_progress(
        &self,
        request: &GenerationRequest,
        on_progress: &mut dyn FnMut(SynthesisProgress),
    ) -> Result<TtsResult, TtsError> {
        let started = Instant::now();
        request.validate()?;

        let spans = SpanCollector::new();
        let units = {
            let _span = SpanGuard::new(&spans, "segment");
            self.segment(&request.text, request.max_chunk_length)
        };
        if units.is_empty() {
            return Err(TtsError::EmptyInput);
        }

        let style = self.voices.load(&request.voice)?;
        let total = units.len();
        on_progress(SynthesisProgress::Segmented { total_units: total });
        log::debug!(target: "narrator_core", "segmented into {} unit(s)", total);

        let mut noise = GaussianNoise::new(request.seed);
        let mut timeline = Timeline::new(self.sample_rate(), request.silence as f64);

        for (index, unit) in units.iter().enumerate() {
            let encoded = self.indexer.encode(&[unit.as_str()])?;

            let durations = {
                let _span = SpanGuard::new(&spans, "duration");
                predict_durations(
                    self.models.duration_predictor.as_ref(),
                    &encoded,
                    &style.dp,
                    request.speed,
                )?
            };
            let text_emb = {
                let _span = SpanGuard::new(&spans, "text_encoder");
                encode_text(self.models.text_encoder.as_ref(), &encoded, &style.ttl)?
            };
            let latent = {
                let _span = SpanGuard::new(&spans, "diffusion");
                let inputs = DiffusionInputs {
                    text_emb: &text_emb,
                    style_ttl: &style.ttl,
                    text_mask: &encoded.mask,
                };
                self.sampler.sample(
                    self.models.vector_estimator.as_ref(),
                    &inputs,
                    &durations,
                    &mut noise,
                )?
            };
            let wav = {
                let _span = SpanGuard::new(&spans, "vocoder");
                vocode(self.models.vocoder.as_ref(), &latent)?
            };

            let duration = durations[0] as f64;
            timeline.push(unit.as_str(), duration, &wav);
            on_progress(SynthesisProgress::UnitComplete {
                index,
                total,
                duration,
            });
        }

        let result = timeline.finish(request.end_silence as f64);
        let latency_ms = started.elapsed().as_millis() as u32;

        log::info!(
            target: "narrator_core",
            "Synthesized {} unit(s), {:.2}s of audio in {}ms with voice '{}'",
            total,
            result.duration,
            latency_ms,
            request.voice
        );
        log::debug!(target: "narrator_core", "stage timings: {}", spans.summary());

        Ok(result.with_latency(latency_ms))
    }
}
