//! Sequential stitching of per-unit waveforms.

use super::response::TtsResult;
use super::subtitle::to_srt;
use serde::{Deserialize, Serialize};

/// Time span of one synthesized unit, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timestamp {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

/// Accumulates unit waveforms in order and tracks their timestamps.
///
/// Silence is inserted between units only. Each unit's audio is trimmed or
/// zero-padded to its predicted duration, so the buffer length and the
/// reported timeline agree.
#[derive(Debug)]
pub struct Timeline {
    sample_rate: u32,
    silence: f64,
    samples: Vec<f32>,
    timestamps: Vec<Timestamp>,
    cursor: f64,
}

impl Timeline {
    pub fn new(sample_rate: u32, silence: f64) -> Self {
        Self {
            sample_rate,
            silence: silence.max(0.0),
            samples: Vec::new(),
            timestamps: Vec::new(),
            cursor: 0.0,
        }
    }

    /// Append one unit's audio.
    pub fn push(&mut self, text: impl Into<String>, duration: f64, wav: &[f32]) {
        if !self.timestamps.is_empty() {
            let gap = self.seconds_to_samples(self.silence);
            self.samples.resize(self.samples.len() + gap, 0.0);
        }

        let start = self.cursor;
        let end = start + duration;
        self.timestamps.push(Timestamp {
            text: text.into(),
            start,
            end,
        });

        let expected = self.seconds_to_samples(duration);
        let take = wav.len().min(expected);
        if take < expected {
            log::warn!(
                target: "narrator_core",
                "Vocoder produced {} samples, predicted duration needs {}; padding with silence",
                wav.len(),
                expected
            );
        }
        self.samples.extend_from_slice(&wav[..take]);
        self.samples.resize(self.samples.len() + (expected - take), 0.0);

        self.cursor = end + self.silence;
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[Timestamp] {
        &self.timestamps
    }

    /// Append trailing silence and produce the result.
    pub fn finish(mut self, end_silence: f64) -> TtsResult {
        let mut duration = self.timestamps.last().map_or(0.0, |t| t.end);
        if end_silence > 0.0 {
            let tail = self.seconds_to_samples(end_silence);
            self.samples.resize(self.samples.len() + tail, 0.0);
            duration += end_silence;
        }

        let subtitles = to_srt(&self.timestamps);
        TtsResult {
            samples: self.samples,
            sample_rate: self.sample_rate,
            duration,
            timestamps: self.timestamps,
            subtitles,
            latency_ms: None,
        }
    }

    fn seconds_to_samples(&self, seconds: f64) -> usize {
        (seconds * self.sample_rate as f64).round().max(0.0) as usize
    }
}
