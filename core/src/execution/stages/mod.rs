//! Model stage glue.
//!
//! Each stage binds its tensors to the graph's fixed input names, runs the
//! backend once (the diffusion sampler once per step), and checks the output
//! it reads back.

pub mod diffusion;
pub mod duration;
pub mod text_encoder;
pub mod vocoder;

pub use diffusion::DiffusionSampler;
pub use duration::predict_durations;
pub use text_encoder::encode_text;
pub use vocoder::vocode;

use crate::runtime_adapter::{InferenceBackend, Tensor};
use crate::tts::error::TtsError;
use std::collections::HashMap;

/// Run `backend` and remove the named output from its results.
pub(crate) fn run_for_output(
    backend: &dyn InferenceBackend,
    inputs: &[(&str, &Tensor)],
    output: &str,
) -> Result<Tensor, TtsError> {
    let mut outputs: HashMap<String, Tensor> = backend.run(inputs).map_err(|e| {
        TtsError::Inference(format!("{} failed: {}", backend.name(), e))
    })?;
    outputs.remove(output).ok_or_else(|| {
        TtsError::Inference(format!(
            "{} returned no '{}' output (got {:?})",
            backend.name(),
            output,
            outputs.keys().collect::<Vec<_>>()
        ))
    })
}

/// Fail with `ShapeMismatch` unless `tensor` is `[batch, _, ...]` with `rank` axes.
pub(crate) fn check_batch(
    tensor: &Tensor,
    what: &str,
    rank: usize,
    batch: usize,
) -> Result<(), TtsError> {
    if tensor.rank() != rank || tensor.dim(0) != Some(batch) {
        return Err(TtsError::ShapeMismatch(format!(
            "{} must be rank {} with batch {}, got {:?}",
            what,
            rank,
            batch,
            tensor.shape()
        )));
    }
    Ok(())
}
