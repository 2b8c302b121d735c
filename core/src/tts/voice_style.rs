//! Voice style loading.
//!
//! A voice is a JSON bundle holding two conditioning tensors:
//!
//! ```json
//! {
//!   "style_ttl": { "dims": [1, 50, 256], "data": [[[...]]], "type": "float32" },
//!   "style_dp":  { "dims": [1, 8, 16],   "data": [[[...]]], "type": "float32" }
//! }
//! ```
//!
//! `data` may be nested to any depth; it is flattened row-major and must hold
//! exactly `dims[1] * dims[2]` values.

use super::error::TtsError;
use crate::runtime_adapter::Tensor;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Conditioning tensors for one voice. Both are `[1, D1, D2]`.
#[derive(Debug, Clone)]
pub struct VoiceStyle {
    /// Text-to-latent conditioning, fed to the text encoder and vector estimator.
    pub ttl: Tensor,
    /// Duration predictor conditioning.
    pub dp: Tensor,
}

#[derive(Deserialize)]
struct StyleBundle {
    style_ttl: StyleComponent,
    style_dp: StyleComponent,
}

#[derive(Deserialize)]
struct StyleComponent {
    dims: Vec<usize>,
    data: Value,
    #[serde(rename = "type", default)]
    #[allow(dead_code)]
    dtype: Option<String>,
}

impl StyleComponent {
    fn into_tensor(self, name: &str) -> Result<Tensor, TtsError> {
        if self.dims.len() != 3 {
            return Err(TtsError::ShapeMismatch(format!(
                "{}: dims must have 3 entries, got {:?}",
                name, self.dims
            )));
        }
        let expected = self.dims[1].checked_mul(self.dims[2]).ok_or_else(|| {
            TtsError::ShapeMismatch(format!("{}: dims {:?} overflow", name, self.dims))
        })?;

        // Sized by the data actually present, never by the declared dims.
        let mut values = Vec::new();
        flatten_into(&self.data, name, &mut values)?;

        if values.len() != expected {
            return Err(TtsError::ShapeMismatch(format!(
                "{}: dims {:?} require {} values, found {}",
                name,
                self.dims,
                expected,
                values.len()
            )));
        }
        Ok(Tensor::from_f32(vec![1, self.dims[1], self.dims[2]], values)?)
    }
}

fn flatten_into(value: &Value, name: &str, out: &mut Vec<f32>) -> Result<(), TtsError> {
    match value {
        Value::Number(n) => {
            let v = n.as_f64().ok_or_else(|| {
                TtsError::Initialization(format!("{}: unrepresentable number {}", name, n))
            })?;
            out.push(v as f32);
        }
        Value::Array(items) => {
            for item in items {
                flatten_into(item, name, out)?;
            }
        }
        other => {
            return Err(TtsError::Initialization(format!(
                "{}: expected numeric data, found {}",
                name, other
            )))
        }
    }
    Ok(())
}

impl VoiceStyle {
    /// Parse an in-memory voice bundle.
    pub fn parse_bundle(bytes: &[u8]) -> Result<Self, TtsError> {
        let bundle: StyleBundle = serde_json::from_slice(bytes)?;
        Ok(Self {
            ttl: bundle.style_ttl.into_tensor("style_ttl")?,
            dp: bundle.style_dp.into_tensor("style_dp")?,
        })
    }
}

/// Resolves voice ids to `<voice_dir>/<id>.json` and caches parsed styles.
///
/// Cached styles live as long as the loader. A second `load` of the same id
/// returns the same `Arc` without touching the filesystem.
pub struct VoiceStyleLoader {
    voice_dir: PathBuf,
    cache: Mutex<HashMap<String, Arc<VoiceStyle>>>,
}

impl VoiceStyleLoader {
    pub fn new(voice_dir: impl Into<PathBuf>) -> Self {
        Self {
            voice_dir: voice_dir.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn voice_dir(&self) -> &Path {
        &self.voice_dir
    }

    /// Load a voice, serving it from cache when already parsed.
    pub fn load(&self, voice_id: &str) -> Result<Arc<VoiceStyle>, TtsError> {
        if let Some(style) = self.lock_cache()?.get(voice_id) {
            return Ok(Arc::clone(style));
        }

        let path = self.voice_path(voice_id)?;
        let bytes = fs::read(&path).map_err(|e| {
            TtsError::Initialization(format!(
                "failed to read voice '{}' from {}: {}",
                voice_id,
                path.display(),
                e
            ))
        })?;
        let style = Arc::new(VoiceStyle::parse_bundle(&bytes)?);

        log::info!(
            target: "narrator_core",
            "Loaded voice '{}' (ttl {:?}, dp {:?})",
            voice_id,
            style.ttl.shape(),
            style.dp.shape()
        );

        let mut cache = self.lock_cache()?;
        let entry = cache
            .entry(voice_id.to_string())
            .or_insert_with(|| Arc::clone(&style));
        Ok(Arc::clone(entry))
    }

    /// Register an already-parsed style under `voice_id`.
    pub fn insert(&self, voice_id: impl Into<String>, style: VoiceStyle) -> Result<(), TtsError> {
        self.lock_cache()?.insert(voice_id.into(), Arc::new(style));
        Ok(())
    }

    pub fn is_cached(&self, voice_id: &str) -> bool {
        self.cache
            .lock()
            .map(|cache| cache.contains_key(voice_id))
            .unwrap_or(false)
    }

    /// Voice ids available in the voice directory, sorted.
    pub fn list_voices(&self) -> Result<Vec<String>, TtsError> {
        let mut voices = Vec::new();
        for entry in fs::read_dir(&self.voice_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                voices.push(stem.to_string());
            }
        }
        voices.sort();
        Ok(voices)
    }

    fn voice_path(&self, voice_id: &str) -> Result<PathBuf, TtsError> {
        if voice_id.is_empty()
            || voice_id.contains('/')
            || voice_id.contains('\\')
            || voice_id.contains("..")
        {
            return Err(TtsError::VoiceNotFound(voice_id.to_string()));
        }
        Ok(self.voice_dir.join(format!("{}.json", voice_id)))
    }

    fn lock_cache(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, Arc<VoiceStyle>>>, TtsError> {
        self.cache
            .lock()
            .map_err(|e| TtsError::Initialization(format!("voice cache poisoned: {}", e)))
    }
}
