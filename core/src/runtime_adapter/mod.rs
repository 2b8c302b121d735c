//! Runtime Adapter module - Interface to the tensor-graph inference engine.
//!
//! The synthesis pipeline never talks to ONNX Runtime directly. Every model stage
//! goes through the [`InferenceBackend`] trait, which accepts named [`Tensor`]
//! inputs and returns named [`Tensor`] outputs.
//!
//! # Module Organization
//!
//! - `tensor` - Typed tensor container (flat buffer + shape, f32 or i64)
//! - `inference_backend` - Backend trait implemented by runtimes and test mocks
//! - `onnx/` - ONNX Runtime backend (cross-platform)
//!
//! # Example
//!
//! ```rust,no_run
//! use narrator_core::runtime_adapter::{InferenceBackend, OnnxBackend, Tensor};
//!
//! let backend = OnnxBackend::load("assets/onnx/vocoder.onnx")?;
//! let latent = Tensor::zeros_f32(vec![1, 144, 32]);
//! let outputs = backend.run(&[("latent", &latent)])?;
//! # Ok::<(), narrator_core::runtime_adapter::AdapterError>(())
//! ```

use thiserror::Error;

pub mod inference_backend;
pub mod tensor;

pub mod onnx;

pub use inference_backend::InferenceBackend;
pub use onnx::{ExecutionProviderKind, OnnxBackend, ONNXSession};
pub use tensor::{ElementType, Tensor, TensorData};

/// Error type for runtime adapter operations.
#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("Model not found: {0}")]
    ModelNotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),
    #[error("Output '{0}' missing from model results")]
    MissingOutput(String),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Runtime error: {0}")]
    RuntimeError(String),
}

/// Result type for runtime adapter operations.
pub type AdapterResult<T> = Result<T, AdapterError>;
