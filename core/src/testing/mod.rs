//! Testing utilities for narrator-core.
//!
//! This module provides mocks, fixtures, and test helpers for unit testing
//! without requiring real model files.
//!
//! ## Usage
//!
//! ```rust
//! use narrator_core::testing::{fixtures, mocks};
//! use narrator_core::tts::GenerationRequest;
//!
//! // Mock graphs: every unit lasts one second
//! let models = mocks::MockModels::new(fixtures::test_engine_config());
//!
//! // Engine over the mocks, with fixture voices in a temp dir
//! let (tts, _dir) = fixtures::engine_with(models);
//! let result = tts.synthesize(&GenerationRequest::new("Hello.", "F1")).unwrap();
//! assert_eq!(result.timestamps.len(), 1);
//! ```

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
