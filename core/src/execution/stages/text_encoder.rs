//! Text encoder stage.

use super::{check_batch, run_for_output};
use crate::preprocessing::EncodedText;
use crate::runtime_adapter::{InferenceBackend, Tensor};
use crate::tts::error::TtsError;

pub const INPUT_TEXT_IDS: &str = "text_ids";
pub const INPUT_STYLE_TTL: &str = "style_ttl";
pub const INPUT_TEXT_MASK: &str = "text_mask";
pub const OUTPUT_TEXT_EMB: &str = "text_emb";

pub const INPUTS: &[&str] = &[INPUT_TEXT_IDS, INPUT_STYLE_TTL, INPUT_TEXT_MASK];

/// Produce the text embedding that conditions every diffusion step.
///
/// The embedding is opaque here beyond its batch dimension.
pub fn encode_text(
    backend: &dyn InferenceBackend,
    text: &EncodedText,
    style_ttl: &Tensor,
) -> Result<Tensor, TtsError> {
    let text_emb = run_for_output(
        backend,
        &[
            (INPUT_TEXT_IDS, &text.ids),
            (INPUT_STYLE_TTL, style_ttl),
            (INPUT_TEXT_MASK, &text.mask),
        ],
        OUTPUT_TEXT_EMB,
    )?;
    check_batch(&text_emb, OUTPUT_TEXT_EMB, 3, text.lengths.len())?;
    log::debug!(target: "narrator_core", "text_emb shape {:?}", text_emb.shape());
    Ok(text_emb)
}
