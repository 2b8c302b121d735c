//! Text preprocessing for synthesis.
//!
//! ```text
//! raw text ──► text::normalize_paragraphs ──► chunking::chunk_text ──► symbols::UnicodeIndexer
//!                (clean, canonical)            (bounded units)          (index + mask tensors)
//! ```

pub mod chunking;
pub mod symbols;
pub mod text;

pub use chunking::{chunk_text, split_sentences, COMPACT_CHUNK_LENGTH, DEFAULT_MAX_CHUNK_LENGTH};
pub use symbols::{length_to_mask, EncodedText, UnicodeIndexer};
pub use text::{is_synthesizable, normalize_paragraphs, normalize_text};
