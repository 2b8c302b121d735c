//! Narrator Core - Text-to-speech synthesis over ONNX Runtime.
//!
//! ## Module Organization
//!
//! The crate is organized into logical groups:
//!
//! ### High-Level API
//! - [`tts`] - Synthesis engine, requests, results, timeline and subtitles
//!
//! ### Pipeline
//! - [`preprocessing`] - Text normalization, segmentation and symbol encoding
//! - [`execution`] - Duration, text encoder, diffusion and vocoder stages
//!
//! ### Runtime
//! - [`runtime_adapter`] - Inference backend trait and ONNX sessions

// ============================================================================
// High-Level Client API
// ============================================================================

/// TTS engine (text-to-speech)
pub mod tts;

// ============================================================================
// Pipeline Stages
// ============================================================================

/// Text normalization, segmentation and symbol encoding
pub mod preprocessing;

/// Model stages and latent noise
pub mod execution;

// ============================================================================
// Runtime
// ============================================================================

/// Inference backend trait and ONNX session management
pub mod runtime_adapter;

// ============================================================================
// Observability & Testing
// ============================================================================

/// Per-request stage timing
pub mod tracing;

/// Mocks and fixtures for tests without model files
pub mod testing;
