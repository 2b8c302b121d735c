//! Splits normalized text into bounded-length synthesis units.
//!
//! Paragraphs (blank-line separated) never share a unit. Inside a paragraph,
//! sentences are packed greedily while the unit stays within the limit. A
//! single sentence longer than the limit becomes a unit on its own.
//!
//! Lengths are counted in characters, not bytes.

use lazy_static::lazy_static;
use regex::Regex;

/// Default maximum characters per unit.
pub const DEFAULT_MAX_CHUNK_LENGTH: usize = 300;

/// Shorter limit used by the compact model configuration.
pub const COMPACT_CHUNK_LENGTH: usize = 50;

const ABBREVIATIONS: &[&str] = &[
    "Dr.", "Mr.", "Mrs.", "Ms.", "Prof.", "Sr.", "Jr.", "St.", "Ave.", "Rd.", "Blvd.", "Dept.",
    "Inc.", "Ltd.", "Co.", "Corp.", "etc.", "vs.", "i.e.", "e.g.", "Ph.D.",
];

lazy_static! {
    static ref PARAGRAPH_BREAK: Regex = Regex::new(r"\n\s*\n").unwrap();
    static ref SENTENCE_END: Regex = Regex::new(r"[.!?]\s+").unwrap();
}

/// Split `text` into units of at most `max_len` characters.
///
/// The result is never empty: text without any boundary comes back as one
/// trimmed unit, and blank input comes back as a single empty unit.
pub fn chunk_text(text: &str, max_len: usize) -> Vec<String> {
    let max_len = max_len.max(1);
    let text = text.trim();
    let mut chunks = Vec::new();

    for para in PARAGRAPH_BREAK.split(text) {
        let para = para.trim();
        if para.is_empty() {
            continue;
        }
        if char_len(para) <= max_len {
            chunks.push(para.to_string());
            continue;
        }
        pack_sentences(&split_sentences(para), max_len, &mut chunks);
    }

    if chunks.is_empty() {
        chunks.push(text.to_string());
    }
    chunks
}

fn pack_sentences(sentences: &[String], max_len: usize, chunks: &mut Vec<String>) {
    let mut current = String::new();
    let mut current_len = 0;

    for sentence in sentences {
        let sentence = sentence.trim();
        if sentence.is_empty() {
            continue;
        }
        let sentence_len = char_len(sentence);

        if !current.is_empty() && current_len + 1 + sentence_len > max_len {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(sentence);
        current_len += sentence_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
}

/// Split a paragraph after sentence-ending punctuation followed by
/// whitespace, except where the punctuation closes a known abbreviation.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut last_end = 0;

    for m in SENTENCE_END.find_iter(text) {
        // include the punctuation mark itself
        let candidate = &text[last_end..m.start() + 1];
        if ends_with_abbreviation(candidate) {
            continue;
        }
        sentences.push(text[last_end..m.end()].trim().to_string());
        last_end = m.end();
    }

    if last_end < text.len() {
        sentences.push(text[last_end..].trim().to_string());
    }
    if sentences.is_empty() {
        sentences.push(text.trim().to_string());
    }
    sentences
}

fn ends_with_abbreviation(candidate: &str) -> bool {
    ABBREVIATIONS.iter().any(|abbrev| {
        candidate.strip_suffix(abbrev).map_or(false, |head| {
            head.chars().last().map_or(true, |c| !c.is_alphanumeric())
        })
    })
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
