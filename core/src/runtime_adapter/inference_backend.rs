//! Inference Backend Trait - Low-level runtime abstraction for model execution.
//!
//! Each of the four TTS graphs (duration predictor, text encoder, vector
//! estimator, vocoder) is held behind one `InferenceBackend`. The backend
//! receives a list of named input tensors and returns every output the graph
//! produces, keyed by output name.

use super::tensor::Tensor;
use super::AdapterResult;
use std::collections::HashMap;

/// Low-level inference backend trait
///
/// Implementations must be `Send + Sync` so an engine holding them can be
/// moved onto the synthesis worker thread.
pub trait InferenceBackend: Send + Sync {
    /// Human-readable model name used in log and error messages
    fn name(&self) -> &str;

    /// Run one forward pass.
    ///
    /// # Arguments
    ///
    /// * `inputs` - `(input name, tensor)` pairs
    ///
    /// # Returns
    ///
    /// Map of output name -> tensor
    fn run(&self, inputs: &[(&str, &Tensor)]) -> AdapterResult<HashMap<String, Tensor>>;

    /// Get input names expected by the loaded model
    fn input_names(&self) -> Vec<String>;

    /// Get output names produced by the loaded model
    fn output_names(&self) -> Vec<String>;
}

impl<B: InferenceBackend + ?Sized> InferenceBackend for Box<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn run(&self, inputs: &[(&str, &Tensor)]) -> AdapterResult<HashMap<String, Tensor>> {
        (**self).run(inputs)
    }

    fn input_names(&self) -> Vec<String> {
        (**self).input_names()
    }

    fn output_names(&self) -> Vec<String> {
        (**self).output_names()
    }
}
