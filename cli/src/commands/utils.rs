//! Shared utility functions for CLI commands.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

/// Truncate a string to a maximum number of characters, adding "..." if truncated.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    } else {
        s.chars().take(max_len).collect()
    }
}

/// Format seconds as `1m 05.3s` or `4.20s`.
pub fn format_seconds(seconds: f64) -> String {
    if seconds >= 60.0 {
        let minutes = (seconds / 60.0).floor();
        format!("{}m {:04.1}s", minutes as u64, seconds - minutes * 60.0)
    } else {
        format!("{:.2}s", seconds)
    }
}

/// Resolve the text to synthesize from `--text` or `--file` (`-` reads stdin).
pub fn read_input_text(text: Option<String>, file: Option<&Path>) -> Result<String> {
    match (text, file) {
        (Some(text), None) => Ok(text),
        (None, Some(path)) if path == Path::new("-") => {
            std::io::read_to_string(std::io::stdin()).context("Failed to read text from stdin")
        }
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read text file {}", path.display())),
        (Some(_), Some(_)) => bail!("Pass either --text or --file, not both"),
        (None, None) => bail!("Either --text or --file must be specified"),
    }
}

/// `out.wav` -> `out.<extension>`, used when a sidecar flag is given without a path.
pub fn sidecar_path(output: &Path, extension: &str) -> PathBuf {
    output.with_extension(extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
        assert_eq!(truncate("\u{00e9}\u{00e9}\u{00e9}\u{00e9}\u{00e9}", 4), "\u{00e9}...");
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(4.2), "4.20s");
        assert_eq!(format_seconds(65.5), "1m 05.5s");
    }

    #[test]
    fn test_read_input_text_requires_one_source() {
        assert!(read_input_text(None, None).is_err());
        assert!(read_input_text(Some("a".into()), Some(Path::new("b.txt"))).is_err());
        assert_eq!(read_input_text(Some("hi".into()), None).unwrap(), "hi");
    }

    #[test]
    fn test_sidecar_path() {
        assert_eq!(
            sidecar_path(Path::new("out/speech.wav"), "srt"),
            PathBuf::from("out/speech.srt")
        );
    }
}
