//! Error types for TTS operations.

use crate::runtime_adapter::AdapterError;
use thiserror::Error;

/// Errors that can occur during synthesis.
///
/// Every variant is fatal for the request that produced it. No partial
/// waveform is returned alongside an error.
#[derive(Debug, Error)]
pub enum TtsError {
    /// Engine, config, indexer or voice resource failed to load.
    #[error("Initialization failed: {0}")]
    Initialization(String),

    /// A voice style or tensor violates its expected dimensions.
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// A model invocation failed or returned a malformed/missing output.
    #[error("Inference failed: {0}")]
    Inference(String),

    /// Text normalizes to nothing synthesizable.
    #[error("Input text has nothing to synthesize")]
    EmptyInput,

    /// Request parameters out of range.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Voice id does not name a usable voice file.
    #[error("Voice not found: {0}")]
    VoiceNotFound(String),

    /// File I/O error.
    #[error("File error: {0}")]
    Io(String),
}

impl From<std::io::Error> for TtsError {
    fn from(err: std::io::Error) -> Self {
        TtsError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for TtsError {
    fn from(err: serde_json::Error) -> Self {
        TtsError::Initialization(format!("invalid JSON: {}", err))
    }
}

impl From<AdapterError> for TtsError {
    fn from(err: AdapterError) -> Self {
        match err {
            AdapterError::ShapeMismatch(msg) => TtsError::ShapeMismatch(msg),
            AdapterError::ModelNotFound(msg) => TtsError::Initialization(msg),
            other => TtsError::Inference(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapter_shape_error_maps_to_shape_mismatch() {
        let err: TtsError = AdapterError::ShapeMismatch("latent".into()).into();
        assert!(matches!(err, TtsError::ShapeMismatch(_)));
    }

    #[test]
    fn test_adapter_failure_maps_to_inference() {
        let err: TtsError = AdapterError::InferenceFailed("boom".into()).into();
        assert!(matches!(err, TtsError::Inference(ref m) if m.contains("boom")));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        assert!(matches!(TtsError::from(io), TtsError::Io(_)));
    }
}
