//! ONNX Runtime backend module.
//!
//! - `ONNXSession`: ONNX Runtime session wrapper (typed tensor in, typed tensor out)
//! - `OnnxBackend`: `InferenceBackend` implementation over one session
//! - `ExecutionProviderKind`: Execution provider selection (CPU, CoreML)

mod backend;
mod execution_provider;
mod session;

// Re-exports
pub use backend::OnnxBackend;
pub use execution_provider::ExecutionProviderKind;
#[cfg(feature = "coreml-ep")]
pub use execution_provider::{CoreMLComputeUnits, CoreMLConfig};
pub use session::ONNXSession;
