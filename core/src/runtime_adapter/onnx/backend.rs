//! ONNX Runtime Inference Backend
//!
//! Wraps one [`ONNXSession`] so it can sit behind the `InferenceBackend` trait.

use super::execution_provider::ExecutionProviderKind;
use super::session::ONNXSession;
use crate::runtime_adapter::inference_backend::InferenceBackend;
use crate::runtime_adapter::tensor::Tensor;
use crate::runtime_adapter::AdapterResult;
use std::collections::HashMap;
use std::path::Path;

/// ONNX Runtime inference backend
pub struct OnnxBackend {
    name: String,
    session: ONNXSession,
}

impl OnnxBackend {
    /// Load a model on the CPU provider.
    pub fn load(model_path: impl AsRef<Path>) -> AdapterResult<Self> {
        Self::load_with_provider(model_path, ExecutionProviderKind::Cpu)
    }

    /// Load a model on the given execution provider.
    pub fn load_with_provider(
        model_path: impl AsRef<Path>,
        provider: ExecutionProviderKind,
    ) -> AdapterResult<Self> {
        let path = model_path.as_ref();
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("model")
            .to_string();
        let session = ONNXSession::with_provider(path, provider)?;
        Ok(Self { name, session })
    }

    pub fn session(&self) -> &ONNXSession {
        &self.session
    }
}

impl InferenceBackend for OnnxBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, inputs: &[(&str, &Tensor)]) -> AdapterResult<HashMap<String, Tensor>> {
        self.session.run(inputs)
    }

    fn input_names(&self) -> Vec<String> {
        self.session.input_names().to_vec()
    }

    fn output_names(&self) -> Vec<String> {
        self.session.output_names().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime_adapter::AdapterError;

    #[test]
    fn test_load_missing_model() {
        let result = OnnxBackend::load("/nonexistent/duration_predictor.onnx");
        assert!(matches!(result, Err(AdapterError::ModelNotFound(_))));
    }
}
