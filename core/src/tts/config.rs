//! Engine and pipeline configuration.
//!
//! [`EngineConfig`] describes the model family and comes from `tts.json` in
//! the model directory. [`TtsConfig`] describes where the assets live and how
//! the pipeline runs them.

use super::error::TtsError;
use crate::preprocessing::DEFAULT_MAX_CHUNK_LENGTH;
use crate::runtime_adapter::ExecutionProviderKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Number of denoising steps the diffusion sampler runs per unit.
pub const DEFAULT_TOTAL_STEP: usize = 8;

pub const ENGINE_CONFIG_FILE: &str = "tts.json";
pub const UNICODE_INDEXER_FILE: &str = "unicode_indexer.json";
pub const VOICE_STYLES_DIR: &str = "voice_styles";

/// Autoencoder settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AutoencoderConfig {
    pub sample_rate: u32,
    pub base_chunk_size: usize,
}

/// Text-to-latent settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextToLatentConfig {
    pub chunk_compress_factor: usize,
    pub latent_dim: usize,
}

/// Model family constants, read once from `tts.json`.
///
/// Unknown keys in the file are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub ae: AutoencoderConfig,
    pub ttl: TextToLatentConfig,
}

impl EngineConfig {
    /// Parse `tts.json` from disk and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TtsError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| {
            TtsError::Initialization(format!(
                "failed to read engine config {}: {}",
                path.display(),
                e
            ))
        })?;
        let config: EngineConfig = serde_json::from_slice(&bytes)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), TtsError> {
        if self.ae.sample_rate == 0
            || self.ae.base_chunk_size == 0
            || self.ttl.chunk_compress_factor == 0
            || self.ttl.latent_dim == 0
        {
            return Err(TtsError::Initialization(format!(
                "engine config values must be positive: {:?}",
                self
            )));
        }
        Ok(())
    }

    pub fn sample_rate(&self) -> u32 {
        self.ae.sample_rate
    }

    /// Waveform samples covered by one latent frame.
    pub fn chunk_size(&self) -> usize {
        self.ae.base_chunk_size * self.ttl.chunk_compress_factor
    }

    /// Channel count of the latent tensor.
    pub fn latent_channels(&self) -> usize {
        self.ttl.latent_dim * self.ttl.chunk_compress_factor
    }
}

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct TtsConfig {
    pub model_dir: PathBuf,
    pub voice_dir: PathBuf,
    pub indexer_file: PathBuf,
    pub max_chunk_length: usize,
    pub total_step: usize,
    pub execution_provider: ExecutionProviderKind,
}

impl TtsConfig {
    /// Defaults rooted at `model_dir`: voices under `voice_styles/`, indexer
    /// at `unicode_indexer.json`.
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        let model_dir = model_dir.into();
        Self {
            voice_dir: model_dir.join(VOICE_STYLES_DIR),
            indexer_file: model_dir.join(UNICODE_INDEXER_FILE),
            model_dir,
            max_chunk_length: DEFAULT_MAX_CHUNK_LENGTH,
            total_step: DEFAULT_TOTAL_STEP,
            execution_provider: ExecutionProviderKind::default(),
        }
    }

    pub fn with_voice_dir(mut self, voice_dir: impl Into<PathBuf>) -> Self {
        self.voice_dir = voice_dir.into();
        self
    }

    pub fn with_indexer_file(mut self, indexer_file: impl Into<PathBuf>) -> Self {
        self.indexer_file = indexer_file.into();
        self
    }

    pub fn with_max_chunk_length(mut self, max_chunk_length: usize) -> Self {
        self.max_chunk_length = max_chunk_length;
        self
    }

    pub fn with_total_step(mut self, total_step: usize) -> Self {
        self.total_step = total_step;
        self
    }

    pub fn with_execution_provider(mut self, provider: ExecutionProviderKind) -> Self {
        self.execution_provider = provider;
        self
    }

    pub fn engine_config_path(&self) -> PathBuf {
        self.model_dir.join(ENGINE_CONFIG_FILE)
    }

    pub fn validate(&self) -> Result<(), TtsError> {
        if self.total_step == 0 {
            return Err(TtsError::Initialization(
                "total_step must be at least 1".to_string(),
            ));
        }
        if self.max_chunk_length == 0 {
            return Err(TtsError::Initialization(
                "max_chunk_length must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const TTS_JSON: &str = r#"{
        "tts_version": "v1",
        "ae": {"sample_rate": 44100, "base_chunk_size": 512},
        "ttl": {"chunk_compress_factor": 6, "latent_dim": 24}
    }"#;

    #[test]
    fn test_engine_config_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(ENGINE_CONFIG_FILE);
        fs::write(&path, TTS_JSON).unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.sample_rate(), 44100);
        assert_eq!(config.chunk_size(), 3072);
        assert_eq!(config.latent_channels(), 144);
    }

    #[test]
    fn test_engine_config_rejects_zero() {
        let config: EngineConfig = serde_json::from_str(
            r#"{"ae": {"sample_rate": 0, "base_chunk_size": 512},
                "ttl": {"chunk_compress_factor": 6, "latent_dim": 24}}"#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_engine_config_missing_file() {
        let err = EngineConfig::load("/nonexistent/tts.json").unwrap_err();
        assert!(matches!(err, TtsError::Initialization(_)));
    }

    #[test]
    fn test_tts_config_defaults() {
        let config = TtsConfig::new("assets/onnx");
        assert_eq!(config.voice_dir, Path::new("assets/onnx/voice_styles"));
        assert_eq!(config.indexer_file, Path::new("assets/onnx/unicode_indexer.json"));
        assert_eq!(config.max_chunk_length, 300);
        assert_eq!(config.total_step, DEFAULT_TOTAL_STEP);
        assert_eq!(config.engine_config_path(), Path::new("assets/onnx/tts.json"));
    }

    #[test]
    fn test_tts_config_builder() {
        let config = TtsConfig::new("m")
            .with_voice_dir("v")
            .with_total_step(4)
            .with_max_chunk_length(50);
        assert_eq!(config.voice_dir, Path::new("v"));
        assert_eq!(config.total_step, 4);
        assert_eq!(config.max_chunk_length, 50);
        assert!(config.validate().is_ok());
        assert!(TtsConfig::new("m").with_total_step(0).validate().is_err());
    }
}
