//! `voices` command: list voice ids in a voice directory.

use anyhow::{Context, Result};
use colored::*;
use narrator_core::tts::VoiceStyleLoader;
use std::path::Path;

pub fn handle_voices_command(voice_dir: &Path) -> Result<()> {
    let loader = VoiceStyleLoader::new(voice_dir);
    let voices = loader
        .list_voices()
        .with_context(|| format!("Failed to list voices in {}", voice_dir.display()))?;

    if voices.is_empty() {
        println!("No voices found in {}", voice_dir.display());
        return Ok(());
    }

    println!("🎤 Voices in {}", voice_dir.display().to_string().cyan().bold());
    for voice in &voices {
        match loader.load(voice) {
            Ok(style) => println!(
                "  {} {} {}",
                "•".bright_cyan(),
                voice.cyan(),
                format!("(ttl {:?}, dp {:?})", style.ttl.shape(), style.dp.shape()).dimmed()
            ),
            Err(err) => println!(
                "  {} {} {}",
                "•".bright_cyan(),
                voice.yellow(),
                format!("(unreadable: {})", err).dimmed()
            ),
        }
    }
    println!("\n{} voice(s)", voices.len());
    Ok(())
}
