//! Test fixtures for common inputs and on-disk assets.
//!
//! Provides small engine configs, indexers and voice bundles that can be used
//! across tests without real model files.

use super::mocks::MockModels;
use crate::preprocessing::UnicodeIndexer;
use crate::tts::config::{
    AutoencoderConfig, EngineConfig, TextToLatentConfig, TtsConfig, ENGINE_CONFIG_FILE,
    UNICODE_INDEXER_FILE, VOICE_STYLES_DIR,
};
use crate::tts::engine::Tts;
use serde_json::json;
use std::fs;
use std::io;
use std::path::Path;
use tempfile::TempDir;

/// Voice ids written by [`write_model_dir`].
pub const FIXTURE_VOICES: [&str; 2] = ["F1", "M1"];

/// Tiny model family: 1 kHz, 20 samples per latent frame, 8 latent channels.
pub fn test_engine_config() -> EngineConfig {
    EngineConfig {
        ae: AutoencoderConfig {
            sample_rate: 1000,
            base_chunk_size: 10,
        },
        ttl: TextToLatentConfig {
            chunk_compress_factor: 2,
            latent_dim: 4,
        },
    }
}

/// Indexer covering printable ASCII; everything else maps to 0.
pub fn test_indexer() -> UnicodeIndexer {
    UnicodeIndexer::from_table(ascii_table())
}

fn ascii_table() -> Vec<i64> {
    (0..128i64)
        .map(|c| if (32..127).contains(&c) { c - 31 } else { -1 })
        .collect()
}

/// Voice bundle JSON with `ttl_count` and `dp_count` values of `i / 10`.
///
/// Counts that disagree with the dims produce a malformed bundle.
pub fn voice_bundle_json(
    ttl_dims: [usize; 3],
    ttl_count: usize,
    dp_dims: [usize; 3],
    dp_count: usize,
) -> String {
    let values = |n: usize| (0..n).map(|i| i as f32 / 10.0).collect::<Vec<_>>();
    json!({
        "style_ttl": { "dims": ttl_dims, "data": values(ttl_count), "type": "float32" },
        "style_dp": { "dims": dp_dims, "data": values(dp_count), "type": "float32" },
    })
    .to_string()
}

/// Write `tts.json`, `unicode_indexer.json` and the fixture voices into `dir`.
///
/// No ONNX graphs are written.
pub fn write_model_dir(dir: &Path, config: &EngineConfig) -> io::Result<()> {
    fs::write(dir.join(ENGINE_CONFIG_FILE), serde_json::to_string(config)?)?;
    fs::write(
        dir.join(UNICODE_INDEXER_FILE),
        serde_json::to_string(&ascii_table())?,
    )?;

    let voice_dir = dir.join(VOICE_STYLES_DIR);
    fs::create_dir_all(&voice_dir)?;
    for voice in FIXTURE_VOICES {
        fs::write(
            voice_dir.join(format!("{}.json", voice)),
            voice_bundle_json([1, 2, 3], 6, [1, 2, 2], 4),
        )?;
    }
    Ok(())
}

/// Fresh temporary model directory populated by [`write_model_dir`].
pub fn temp_model_dir(config: &EngineConfig) -> TempDir {
    let dir = TempDir::new().expect("create temp model dir");
    write_model_dir(dir.path(), config).expect("write model fixtures");
    dir
}

/// Engine over `mocks` with fixture assets in a temporary directory.
///
/// Keep the returned `TempDir` alive for as long as the engine loads voices.
pub fn engine_with(mocks: MockModels) -> (Tts, TempDir) {
    engine_with_config(mocks, |config| config)
}

/// Like [`engine_with`], with a hook to adjust the `TtsConfig`.
pub fn engine_with_config(
    mocks: MockModels,
    configure: impl FnOnce(TtsConfig) -> TtsConfig,
) -> (Tts, TempDir) {
    let engine_config = test_engine_config();
    let dir = temp_model_dir(&engine_config);
    let config = configure(TtsConfig::new(dir.path()));
    let tts = Tts::with_models(config, engine_config, test_indexer(), mocks.into_models())
        .expect("assemble mock engine");
    (tts, dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexer_maps_ascii_to_nonzero() {
        let indexer = test_indexer();
        for c in "Hello, world.".chars() {
            assert_ne!(indexer.index_of(c), 0, "{:?}", c);
        }
        assert_eq!(indexer.index_of('\u{00e9}'), 0);
    }

    #[test]
    fn test_model_dir_round_trips_config() {
        let config = test_engine_config();
        let dir = temp_model_dir(&config);
        let loaded = EngineConfig::load(dir.path().join(ENGINE_CONFIG_FILE)).unwrap();
        assert_eq!(loaded, config);
        assert!(dir.path().join(VOICE_STYLES_DIR).join("F1.json").is_file());
    }
}
