//! TTS request types.

use super::error::TtsError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SPEED: f32 = 1.0;
pub const DEFAULT_SILENCE_SECS: f32 = 0.3;
pub const DEFAULT_END_SILENCE_SECS: f32 = 0.5;

/// Request for TTS synthesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Text to synthesize
    pub text: String,

    /// Voice id, resolved to `<voice_dir>/<voice>.json`
    pub voice: String,

    /// Speech speed multiplier (> 1.0 speaks faster)
    pub speed: f32,

    /// Silence inserted between units, in seconds
    pub silence: f32,

    /// Silence appended after the last unit, in seconds
    pub end_silence: f32,

    /// Overrides the engine's maximum unit length
    pub max_chunk_length: Option<usize>,

    /// Seed for the latent noise; `None` draws from entropy
    pub seed: Option<u64>,
}

impl GenerationRequest {
    /// Create a new request with default options.
    pub fn new(text: impl Into<String>, voice: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice: voice.into(),
            speed: DEFAULT_SPEED,
            silence: DEFAULT_SILENCE_SECS,
            end_silence: DEFAULT_END_SILENCE_SECS,
            max_chunk_length: None,
            seed: None,
        }
    }

    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = voice.into();
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_silence(mut self, seconds: f32) -> Self {
        self.silence = seconds;
        self
    }

    pub fn with_end_silence(mut self, seconds: f32) -> Self {
        self.end_silence = seconds;
        self
    }

    pub fn with_max_chunk_length(mut self, max_chunk_length: usize) -> Self {
        self.max_chunk_length = Some(max_chunk_length);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate the request.
    ///
    /// Text emptiness is checked after normalization by the engine, not here.
    pub fn validate(&self) -> Result<(), TtsError> {
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(TtsError::InvalidRequest(format!(
                "speed must be a positive number, got {}",
                self.speed
            )));
        }
        if !self.silence.is_finite() || self.silence < 0.0 {
            return Err(TtsError::InvalidRequest(format!(
                "silence must be >= 0, got {}",
                self.silence
            )));
        }
        if !self.end_silence.is_finite() || self.end_silence < 0.0 {
            return Err(TtsError::InvalidRequest(format!(
                "end_silence must be >= 0, got {}",
                self.end_silence
            )));
        }
        if self.max_chunk_length == Some(0) {
            return Err(TtsError::InvalidRequest(
                "max_chunk_length must be at least 1".to_string(),
            ));
        }
        if self.voice.is_empty() {
            return Err(TtsError::InvalidRequest("voice id is empty".to_string()));
        }
        Ok(())
    }
}
