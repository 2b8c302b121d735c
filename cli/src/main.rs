//! Narrator CLI - Command-line front end for the narrator text-to-speech pipeline.
//!
//! ## Module Organization
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`commands`] | Command handlers organized by subcommand |
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `synth` | Synthesize text to a WAV file, with optional SRT and timestamps |
//! | `voices` | List voice ids available in a voice directory |

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::synth::SynthArgs;
use std::path::PathBuf;

/// Narrator CLI - Text-to-speech with timed subtitles
#[derive(Parser)]
#[command(name = "narrator", version)]
#[command(about = "Narrator CLI - Synthesize speech and subtitles from text", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesize text into a WAV file
    Synth(SynthArgs),
    /// List available voices
    Voices {
        /// Directory holding `<voice>.json` style bundles
        #[arg(long, value_name = "DIR", env = "NARRATOR_VOICE_DIR")]
        voice_dir: PathBuf,
    },
}

fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "info,narrator_core=debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Synth(args) => commands::synth::handle_synth_command(args).await,
        Commands::Voices { voice_dir } => commands::voices::handle_voices_command(&voice_dir),
    }
}
