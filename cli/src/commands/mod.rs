//! CLI command handlers organized by subcommand.
//!
//! | Module | Commands |
//! |--------|----------|
//! | [`synth`] | `synth` - Text to WAV, SRT and timestamps |
//! | [`voices`] | `voices` - List voice ids |
//! | [`utils`] | Shared helpers |

pub mod synth;
pub mod utils;
pub mod voices;
