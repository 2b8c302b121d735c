//! TTS response types.

use super::error::TtsError;
use super::timeline::Timestamp;
use std::path::Path;

/// Finished synthesis: stitched waveform plus its timing.
///
/// The caller owns the result outright; the engine keeps nothing.
#[derive(Debug, Clone)]
pub struct TtsResult {
    /// Mono samples (float32, -1.0 to 1.0)
    pub samples: Vec<f32>,

    /// Sample rate in Hz, fixed by the engine config
    pub sample_rate: u32,

    /// Total duration in seconds, including all inserted silence
    pub duration: f64,

    /// One entry per synthesized unit, in order
    pub timestamps: Vec<Timestamp>,

    /// SRT rendering of `timestamps`
    pub subtitles: String,

    /// Wall-clock synthesis time in milliseconds (if measured)
    pub latency_ms: Option<u32>,
}

impl TtsResult {
    /// Set the latency measurement.
    pub fn with_latency(mut self, latency_ms: u32) -> Self {
        self.latency_ms = Some(latency_ms);
        self
    }

    /// Duration implied by the sample buffer.
    pub fn buffer_duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Convert samples to 16-bit PCM.
    pub fn to_i16(&self) -> Vec<i16> {
        self.samples
            .iter()
            .map(|s| (s.clamp(-1.0, 1.0) * 32767.0) as i16)
            .collect()
    }

    /// Convert samples to bytes (16-bit PCM, little-endian).
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_i16()
            .into_iter()
            .flat_map(|sample| sample.to_le_bytes())
            .collect()
    }

    /// Encode as mono 16-bit WAV file bytes.
    pub fn to_wav(&self) -> Vec<u8> {
        const CHANNELS: u16 = 1;
        const BITS_PER_SAMPLE: u16 = 16;

        let data = self.to_bytes();
        let data_size = data.len() as u32;
        let byte_rate = self.sample_rate * CHANNELS as u32 * BITS_PER_SAMPLE as u32 / 8;
        let block_align = CHANNELS * BITS_PER_SAMPLE / 8;

        let mut wav = Vec::with_capacity(44 + data.len());

        // RIFF header
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&(36 + data_size).to_le_bytes());
        wav.extend_from_slice(b"WAVE");

        // fmt chunk
        wav.extend_from_slice(b"fmt ");
        wav.extend_from_slice(&16u32.to_le_bytes());
        wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
        wav.extend_from_slice(&CHANNELS.to_le_bytes());
        wav.extend_from_slice(&self.sample_rate.to_le_bytes());
        wav.extend_from_slice(&byte_rate.to_le_bytes());
        wav.extend_from_slice(&block_align.to_le_bytes());
        wav.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

        // data chunk
        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&data_size.to_le_bytes());
        wav.extend_from_slice(&data);

        wav
    }

    /// Save audio to a WAV file.
    pub fn save_wav(&self, path: impl AsRef<Path>) -> Result<(), TtsError> {
        std::fs::write(path, self.to_wav())?;
        Ok(())
    }

    /// Save the subtitle track as an `.srt` file.
    pub fn save_srt(&self, path: impl AsRef<Path>) -> Result<(), TtsError> {
        std::fs::write(path, &self.subtitles)?;
        Ok(())
    }

    /// Timestamps as a JSON array of `{text, start, end}`.
    pub fn timestamps_json(&self) -> Result<String, TtsError> {
        serde_json::to_string_pretty(&self.timestamps)
            .map_err(|e| TtsError::Io(format!("failed to serialize timestamps: {}", e)))
    }

    pub fn save_timestamps_json(&self, path: impl AsRef<Path>) -> Result<(), TtsError> {
        std::fs::write(path, self.timestamps_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn result(samples: Vec<f32>) -> TtsResult {
        TtsResult {
            samples,
            sample_rate: 24000,
            duration: 0.0,
            timestamps: vec![Timestamp {
                text: "Hi.".to_string(),
                start: 0.0,
                end: 0.25,
            }],
            subtitles: "1\n00:00:00,000 --> 00:00:00,250\nHi.\n\n".to_string(),
            latency_ms: None,
        }
    }

    #[test]
    fn test_to_i16() {
        let i16_samples = result(vec![0.0, 0.5, -0.5, 1.0, -1.0, 1.5]).to_i16();
        assert_eq!(i16_samples, vec![0, 16383, -16383, 32767, -32767, 32767]);
    }

    #[test]
    fn test_wav_header() {
        let wav = result(vec![0.0; 100]).to_wav();
        assert_eq!(wav.len(), 44 + 200);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(&wav[24..28], &24000u32.to_le_bytes());
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(&wav[40..44], &200u32.to_le_bytes());
    }

    #[test]
    fn test_buffer_duration_and_latency() {
        let out = result(vec![0.0; 12000]).with_latency(150);
        assert_eq!(out.buffer_duration(), 0.5);
        assert_eq!(out.latency_ms, Some(150));
    }

    #[test]
    fn test_save_outputs() {
        let dir = TempDir::new().unwrap();
        let out = result(vec![0.1; 10]);
        out.save_wav(dir.path().join("a.wav")).unwrap();
        out.save_srt(dir.path().join("a.srt")).unwrap();
        out.save_timestamps_json(dir.path().join("a.json")).unwrap();

        let srt = std::fs::read_to_string(dir.path().join("a.srt")).unwrap();
        assert!(srt.starts_with("1\n00:00:00,000 --> 00:00:00,250"));
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join("a.json")).unwrap())
                .unwrap();
        assert_eq!(json[0]["text"], "Hi.");
        assert_eq!(json[0]["end"], 0.25);
    }
}
