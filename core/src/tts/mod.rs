//! TTS (Text-to-Speech) synthesis engine.
//!
//! Turns a [`GenerationRequest`] into a [`TtsResult`]: one waveform plus a
//! timestamp per text unit and matching SRT subtitles.
//!
//! ```text
//! text ─► normalize ─► segment ─┬─► encode ─► duration ─► text_encoder ─► diffusion ×N ─► vocoder ─┐
//!                               │                       (per unit, in order)                       │
//!                               └─────────────────────── Timeline ◄───────────────────────────────┘
//!                                                           │
//!                                                 samples + timestamps + SRT
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use narrator_core::tts::{GenerationRequest, Tts};
//!
//! let tts = Tts::new("assets/onnx")?;
//! let result = tts.synthesize(&GenerationRequest::new("Hello there. This is a test.", "F1"))?;
//! for ts in &result.timestamps {
//!     println!("{:.2}-{:.2} {}", ts.start, ts.end, ts.text);
//! }
//! # Ok::<(), narrator_core::tts::TtsError>(())
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod request;
pub mod response;
pub mod subtitle;
pub mod timeline;
pub mod voice_style;
pub mod worker;

pub use config::{EngineConfig, TtsConfig, DEFAULT_TOTAL_STEP};
pub use engine::{SynthesisProgress, Tts};
pub use error::TtsError;
pub use request::GenerationRequest;
pub use response::TtsResult;
pub use subtitle::{format_srt_time, to_srt};
pub use timeline::{Timeline, Timestamp};
pub use voice_style::{VoiceStyle, VoiceStyleLoader};
pub use worker::{SynthesisWorker, WorkerEvent};
