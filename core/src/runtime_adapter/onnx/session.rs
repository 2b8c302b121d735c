//! ONNX Runtime session wrapper for managing model sessions and inference.
//!
//! This module provides a wrapper around ONNX Runtime sessions that:
//! - Manages session lifecycle
//! - Extracts model metadata (input/output names)
//! - Handles execution provider selection (CPU, CoreML)
//! - Converts between [`Tensor`] and `ort` values at the boundary
//!
//! # Example
//!
//! ```rust,no_run
//! use narrator_core::runtime_adapter::onnx::{ONNXSession, ExecutionProviderKind};
//! use narrator_core::runtime_adapter::Tensor;
//!
//! let session = ONNXSession::with_provider("vocoder.onnx", ExecutionProviderKind::Cpu)?;
//! let latent = Tensor::zeros_f32(vec![1, 144, 16]);
//! let outputs = session.run(&[("latent", &latent)])?;
//! # Ok::<(), narrator_core::runtime_adapter::AdapterError>(())
//! ```

use super::execution_provider::ExecutionProviderKind;
use crate::runtime_adapter::tensor::{Tensor, TensorData};
use crate::runtime_adapter::{AdapterError, AdapterResult};
use ort::session::{builder::GraphOptimizationLevel, Session, SessionInputValue, SessionInputs};
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

/// ONNX Runtime session wrapper.
pub struct ONNXSession {
    /// The ONNX Runtime session (wrapped in Mutex for thread-safe interior mutability)
    session: Mutex<Session>,
    /// Input names from the model
    input_names: Vec<String>,
    /// Output names from the model
    output_names: Vec<String>,
    /// The execution provider used for this session
    execution_provider: ExecutionProviderKind,
}

impl ONNXSession {
    /// Creates a new ONNX session with the specified execution provider.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Model file doesn't exist
    /// - Model loading fails
    /// - Execution provider initialization fails
    pub fn with_provider(
        model_path: impl AsRef<Path>,
        execution_provider: ExecutionProviderKind,
    ) -> AdapterResult<Self> {
        let path = model_path.as_ref();
        if !path.exists() {
            return Err(AdapterError::ModelNotFound(format!(
                "Model file not found: {}",
                path.display()
            )));
        }

        // Initialize ONNX Runtime environment (singleton, safe to call multiple times)
        let _ = ort::init().commit();

        let mut builder = Session::builder()
            .map_err(|e| {
                AdapterError::RuntimeError(format!("Failed to create session builder: {}", e))
            })?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| {
                AdapterError::RuntimeError(format!("Failed to set optimization level: {}", e))
            })?;

        builder = Self::configure_execution_provider(builder, &execution_provider)?;

        let session = builder.commit_from_file(path).map_err(|e| {
            AdapterError::RuntimeError(format!(
                "Failed to load ONNX model {}: {}",
                path.display(),
                e
            ))
        })?;

        let input_names: Vec<String> = session
            .inputs()
            .iter()
            .map(|input| input.name().to_string())
            .collect();
        let output_names: Vec<String> = session
            .outputs()
            .iter()
            .map(|output| output.name().to_string())
            .collect();

        log::info!(
            target: "narrator_core",
            "Created ONNX session with {} execution provider for model: {}",
            execution_provider,
            path.display()
        );
        log::debug!(
            target: "narrator_core",
            "inputs={:?} outputs={:?}",
            input_names,
            output_names
        );

        Ok(Self {
            session: Mutex::new(session),
            input_names,
            output_names,
            execution_provider,
        })
    }

    /// Configures the execution provider on the session builder.
    fn configure_execution_provider(
        builder: ort::session::builder::SessionBuilder,
        provider: &ExecutionProviderKind,
    ) -> AdapterResult<ort::session::builder::SessionBuilder> {
        match provider {
            ExecutionProviderKind::Cpu => Ok(builder),

            #[cfg(feature = "coreml-ep")]
            ExecutionProviderKind::CoreML(config) => {
                use super::execution_provider::CoreMLComputeUnits;
                use ort::ep;

                let coreml_ep = ep::CoreML::default()
                    .with_subgraphs(config.use_subgraphs)
                    .with_compute_units(match config.compute_units {
                        CoreMLComputeUnits::CpuOnly => ep::coreml::ComputeUnits::CPUOnly,
                        CoreMLComputeUnits::CpuAndGpu => ep::coreml::ComputeUnits::CPUAndGPU,
                        CoreMLComputeUnits::CpuAndNeuralEngine => {
                            ep::coreml::ComputeUnits::CPUAndNeuralEngine
                        }
                        CoreMLComputeUnits::All => ep::coreml::ComputeUnits::All,
                    })
                    .build();

                log::debug!(target: "narrator_core", "Configuring CoreML execution provider: {:?}", config);

                builder.with_execution_providers([coreml_ep]).map_err(|e| {
                    AdapterError::RuntimeError(format!(
                        "Failed to configure CoreML execution provider: {}",
                        e
                    ))
                })
            }
        }
    }

    /// Runs inference with named, typed inputs.
    ///
    /// Every model output is returned. Outputs are extracted as `f32` first and
    /// fall back to `i64`; other element types are an error.
    pub fn run(&self, inputs: &[(&str, &Tensor)]) -> AdapterResult<HashMap<String, Tensor>> {
        let mut ort_inputs: Vec<(Cow<'_, str>, SessionInputValue<'_>)> =
            Vec::with_capacity(inputs.len());
        for (name, tensor) in inputs {
            ort_inputs.push((Cow::Owned(name.to_string()), to_session_value(name, tensor)?));
        }

        let mut session_guard = self
            .session
            .lock()
            .map_err(|e| AdapterError::RuntimeError(format!("Failed to lock session: {}", e)))?;

        let outputs = session_guard
            .run(SessionInputs::from(ort_inputs))
            .map_err(|e| {
                AdapterError::InferenceFailed(format!("ONNX Runtime inference failed: {}", e))
            })?;

        let mut result = HashMap::with_capacity(self.output_names.len());
        for output_name in &self.output_names {
            let value = outputs
                .get(output_name.as_str())
                .ok_or_else(|| AdapterError::MissingOutput(output_name.clone()))?;

            let tensor = if let Ok((shape, data)) = value.try_extract_tensor::<f32>() {
                Tensor::from_f32(to_dims(shape), data.to_vec())?
            } else if let Ok((shape, data)) = value.try_extract_tensor::<i64>() {
                Tensor::from_i64(to_dims(shape), data.to_vec())?
            } else {
                return Err(AdapterError::RuntimeError(format!(
                    "Failed to extract output '{}': unsupported type (expected f32 or i64)",
                    output_name
                )));
            };
            result.insert(output_name.clone(), tensor);
        }

        Ok(result)
    }

    /// Returns input names.
    pub fn input_names(&self) -> &[String] {
        &self.input_names
    }

    /// Returns output names.
    pub fn output_names(&self) -> &[String] {
        &self.output_names
    }

    /// Returns the execution provider used for this session.
    pub fn execution_provider(&self) -> &ExecutionProviderKind {
        &self.execution_provider
    }
}

fn to_session_value<'v>(name: &str, tensor: &Tensor) -> AdapterResult<SessionInputValue<'v>> {
    let shape: Vec<i64> = tensor.shape().iter().map(|&d| d as i64).collect();
    let convert_err =
        |e: ort::Error| AdapterError::InvalidInput(format!("Failed to convert '{}': {}", name, e));

    let value = match tensor.data() {
        TensorData::F32(data) => ort::value::Tensor::from_array((shape, data.clone()))
            .map_err(convert_err)?
            .into_dyn(),
        TensorData::I64(data) => ort::value::Tensor::from_array((shape, data.clone()))
            .map_err(convert_err)?
            .into_dyn(),
    };
    Ok(value.into())
}

fn to_dims(shape: &[i64]) -> Vec<usize> {
    shape.iter().map(|&d| d.max(0) as usize).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_session_creation_fails_on_nonexistent_file() {
        let result = ONNXSession::with_provider("/nonexistent/model.onnx", ExecutionProviderKind::Cpu);
        assert!(matches!(result, Err(AdapterError::ModelNotFound(_))));
    }

    #[test]
    fn test_session_creation_rejects_invalid_model() {
        let temp_dir = TempDir::new().unwrap();
        let model_path = temp_dir.path().join("vocoder.onnx");
        fs::write(&model_path, b"not a protobuf").unwrap();

        let result = ONNXSession::with_provider(&model_path, ExecutionProviderKind::Cpu);
        assert!(result.is_err());
    }

    #[test]
    fn test_to_dims_clamps_dynamic() {
        assert_eq!(to_dims(&[1, -1, 4]), vec![1, 0, 4]);
    }
}
