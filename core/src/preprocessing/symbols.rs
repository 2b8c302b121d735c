//! Symbol encoder: text units to vocabulary index tensors.
//!
//! The model vocabulary is a lookup table indexed by Unicode code point
//! (`unicode_indexer.json`, a flat JSON array). Code points past the end of
//! the table, or mapped to a negative entry, encode as index 0.

use crate::runtime_adapter::Tensor;
use crate::tts::error::TtsError;
use std::fs;
use std::path::Path;

/// Batched index tensor plus its validity mask.
#[derive(Debug, Clone)]
pub struct EncodedText {
    /// `[batch, max_len]` i64, zero-padded on the right.
    pub ids: Tensor,
    /// `[batch, 1, max_len]` f32, 1.0 where a symbol is present.
    pub mask: Tensor,
    /// Symbol count per row.
    pub lengths: Vec<usize>,
}

/// Code point to vocabulary index table.
#[derive(Debug, Clone)]
pub struct UnicodeIndexer {
    table: Vec<i64>,
}

impl UnicodeIndexer {
    /// Load the table from a JSON array file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TtsError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| {
            TtsError::Initialization(format!(
                "failed to read unicode indexer {}: {}",
                path.display(),
                e
            ))
        })?;
        let table: Vec<i64> = serde_json::from_slice(&bytes).map_err(|e| {
            TtsError::Initialization(format!(
                "invalid unicode indexer {}: {}",
                path.display(),
                e
            ))
        })?;
        log::debug!(target: "narrator_core", "Loaded unicode indexer with {} entries", table.len());
        Ok(Self { table })
    }

    pub fn from_table(table: Vec<i64>) -> Self {
        Self { table }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Vocabulary index for one character.
    pub fn index_of(&self, c: char) -> i64 {
        match self.table.get(c as usize) {
            Some(&idx) if idx >= 0 => idx,
            _ => 0,
        }
    }

    /// Encode a batch of units.
    ///
    /// `max_len` is the longest unit in the batch, measured in characters.
    pub fn encode<S: AsRef<str>>(&self, units: &[S]) -> Result<EncodedText, TtsError> {
        let lengths: Vec<usize> = units.iter().map(|u| u.as_ref().chars().count()).collect();
        let max_len = lengths.iter().copied().max().unwrap_or(0);

        let mut ids = vec![0i64; units.len() * max_len];
        for (row, unit) in units.iter().enumerate() {
            let offset = row * max_len;
            for (col, c) in unit.as_ref().chars().enumerate() {
                ids[offset + col] = self.index_of(c);
            }
        }

        let ids = Tensor::from_i64(vec![units.len(), max_len], ids)?;
        let mask = length_to_mask(&lengths, max_len);
        Ok(EncodedText { ids, mask, lengths })
    }
}

/// `[batch, 1, max_len]` mask with ones at positions `< lengths[row]`.
pub fn length_to_mask(lengths: &[usize], max_len: usize) -> Tensor {
    let mut mask = Tensor::zeros_f32(vec![lengths.len(), 1, max_len]);
    if let Ok(data) = mask.as_f32_mut() {
        for (row, &len) in lengths.iter().enumerate() {
            let start = row * max_len;
            data[start..start + len.min(max_len)].fill(1.0);
        }
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ascii_indexer() -> UnicodeIndexer {
        // 'a' (97) -> 1, 'b' -> 2, 'c' -> -1
        let mut table = vec![-1i64; 128];
        table['a' as usize] = 1;
        table['b' as usize] = 2;
        table[' ' as usize] = 3;
        UnicodeIndexer::from_table(table)
    }

    #[test]
    fn test_encode_single_unit() {
        let enc = ascii_indexer().encode(&["ab a"]).unwrap();
        assert_eq!(enc.ids.shape(), &[1, 4]);
        assert_eq!(enc.ids.as_i64().unwrap(), &[1, 2, 3, 1]);
        assert_eq!(enc.mask.shape(), &[1, 1, 4]);
        assert_eq!(enc.mask.as_f32().unwrap(), &[1.0; 4]);
        assert_eq!(enc.lengths, vec![4]);
    }

    #[test]
    fn test_encode_batch_pads_right() {
        let enc = ascii_indexer().encode(&["abab", "ba"]).unwrap();
        assert_eq!(enc.ids.shape(), &[2, 4]);
        assert_eq!(enc.ids.as_i64().unwrap(), &[1, 2, 1, 2, 2, 1, 0, 0]);
        assert_eq!(
            enc.mask.as_f32().unwrap(),
            &[1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0]
        );
    }

    #[test]
    fn test_unknown_symbols_map_to_zero() {
        let enc = ascii_indexer().encode(&["c\u{00E9}"]).unwrap();
        assert_eq!(enc.ids.as_i64().unwrap(), &[0, 0]);
    }

    #[test]
    fn test_length_to_mask() {
        let mask = length_to_mask(&[1, 3], 3);
        assert_eq!(mask.shape(), &[2, 1, 3]);
        assert_eq!(mask.as_f32().unwrap(), &[1.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("unicode_indexer.json");
        std::fs::write(&path, "[5, 6, 7]").unwrap();
        let indexer = UnicodeIndexer::from_file(&path).unwrap();
        assert_eq!(indexer.len(), 3);
        assert_eq!(indexer.index_of('\u{1}'), 6);
    }

    #[test]
    fn test_from_file_missing() {
        let err = UnicodeIndexer::from_file("/nonexistent/unicode_indexer.json").unwrap_err();
        assert!(matches!(err, TtsError::Initialization(_)));
    }
}
