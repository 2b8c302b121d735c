//! SRT caption rendering.

use super::timeline::Timestamp;
use std::fmt::Write;

/// Format seconds as `HH:MM:SS,mmm`, rounded to the nearest millisecond.
pub fn format_srt_time(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;
    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

/// Render timestamps as numbered SRT blocks, indexed from 1.
pub fn to_srt(timestamps: &[Timestamp]) -> String {
    let mut srt = String::new();
    for (i, ts) in timestamps.iter().enumerate() {
        // writing into a String cannot fail
        let _ = write!(
            srt,
            "{}\n{} --> {}\n{}\n\n",
            i + 1,
            format_srt_time(ts.start),
            format_srt_time(ts.end),
            ts.text
        );
    }
    srt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(text: &str, start: f64, end: f64) -> Timestamp {
        Timestamp {
            text: text.to_string(),
            start,
            end,
        }
    }

    #[test]
    fn test_format_srt_time() {
        assert_eq!(format_srt_time(0.0), "00:00:00,000");
        assert_eq!(format_srt_time(1.8), "00:00:01,800");
        assert_eq!(format_srt_time(61.0006), "00:01:01,001");
        assert_eq!(format_srt_time(3723.25), "01:02:03,250");
        assert_eq!(format_srt_time(-1.0), "00:00:00,000");
    }

    #[test]
    fn test_to_srt_blocks() {
        let srt = to_srt(&[ts("Hello.", 0.0, 1.5), ts("World.", 1.8, 3.8)]);
        assert_eq!(
            srt,
            "1\n00:00:00,000 --> 00:00:01,500\nHello.\n\n\
             2\n00:00:01,800 --> 00:00:03,800\nWorld.\n\n"
        );
    }

    #[test]
    fn test_to_srt_block_count_and_order() {
        let stamps: Vec<Timestamp> = (0..12)
            .map(|i| ts(&format!("unit {}", i), i as f64 * 2.0, i as f64 * 2.0 + 1.25))
            .collect();
        let srt = to_srt(&stamps);
        let blocks: Vec<&str> = srt.trim_end().split("\n\n").collect();
        assert_eq!(blocks.len(), 12);
        for (i, block) in blocks.iter().enumerate() {
            let lines: Vec<&str> = block.lines().collect();
            assert_eq!(lines[0], (i + 1).to_string());
            let (start, end) = lines[1].split_once(" --> ").unwrap();
            assert_eq!(start.len(), 12);
            assert!(end > start);
            assert_eq!(lines[2], format!("unit {}", i));
        }
    }

    #[test]
    fn test_empty() {
        assert_eq!(to_srt(&[]), "");
    }
}
