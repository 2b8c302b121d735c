//! Text normalization for synthesis.
//!
//! [`normalize_text`] turns arbitrary user text into the restricted form the
//! symbol encoder expects: compatibility-decomposed, free of emoji and
//! decorative symbols, with ASCII quotes and dashes, tidy spacing around
//! punctuation and a closing punctuation mark.
//!
//! Normalization never fails and is idempotent.

use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref EMOJI: Regex = Regex::new(concat!(
        r"[\x{1F600}-\x{1F64F}\x{1F300}-\x{1F5FF}\x{1F680}-\x{1F6FF}",
        r"\x{1F700}-\x{1F77F}\x{1F780}-\x{1F7FF}\x{1F800}-\x{1F8FF}",
        r"\x{1F900}-\x{1F9FF}\x{1FA00}-\x{1FA6F}\x{1FA70}-\x{1FAFF}",
        r"\x{2600}-\x{26FF}\x{2700}-\x{27BF}\x{1F1E6}-\x{1F1FF}]+"
    ))
    .unwrap();
    static ref SPACE_BEFORE_PUNCT: Regex = Regex::new(r" ([,.!?;:'])").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref PARAGRAPH_BREAK: Regex = Regex::new(r"\n\s*\n").unwrap();
}

/// Single-character substitutions applied after decomposition.
const SUBSTITUTIONS: &[(char, &str)] = &[
    ('\u{2013}', "-"), // en dash
    ('\u{2011}', "-"), // non-breaking hyphen
    ('\u{2014}', "-"), // em dash
    ('_', " "),
    ('\u{201C}', "\""),
    ('\u{201D}', "\""),
    ('\u{2018}', "'"),
    ('\u{2019}', "'"),
    ('\u{00B4}', "'"), // acute accent
    ('`', "'"),
    ('[', " "),
    (']', " "),
    ('|', " "),
    ('/', " "),
    ('#', " "),
    ('\u{2192}', " "), // →
    ('\u{2190}', " "), // ←
];

const DECORATIVE: &[char] = &['\u{2665}', '\u{2606}', '\u{2661}', '\u{00A9}', '\\'];

const EXPRESSIONS: &[(&str, &str)] = &[
    ("@", " at "),
    ("e.g.,", "for example, "),
    ("i.e.,", "that is, "),
];

/// Characters that may end a normalized string without a period being appended.
const TERMINALS: &[char] = &[
    '.', '!', '?', ';', ':', ',', '\'', '"', '\u{201D}', '\u{201C}', '\u{2019}', '\u{2018}', ')',
    ']', '}', '\u{2026}', '\u{3002}', '\u{300D}', '\u{300F}', '\u{3011}', '\u{3009}', '\u{300B}',
    '\u{203A}', '\u{00BB}',
];

fn is_stripped_mark(c: char) -> bool {
    matches!(c, '\u{0302}'..='\u{0308}' | '\u{030A}'..='\u{030C}' | '\u{0327}'..='\u{032F}')
}

/// Normalize one block of text.
///
/// Degenerate input (empty, whitespace, emoji only) yields `"."`.
pub fn normalize_text(text: &str) -> String {
    let decomposed: String = text.nfkd().collect();
    let without_emoji = EMOJI.replace_all(&decomposed, "");

    let mut out = String::with_capacity(without_emoji.len());
    for c in without_emoji.chars() {
        if let Some((_, to)) = SUBSTITUTIONS.iter().find(|(from, _)| *from == c) {
            out.push_str(to);
        } else if !is_stripped_mark(c) && !DECORATIVE.contains(&c) {
            out.push(c);
        }
    }

    let mut text = tidy_spacing(&out);
    for (from, to) in EXPRESSIONS {
        text = text.replace(from, to);
    }
    text = tidy_spacing(&text);

    for run in ["\"\"", "''", "``"] {
        let single = &run[..1];
        while text.contains(run) {
            text = text.replace(run, single);
        }
    }

    let mut text = text.trim().to_string();
    if !text.ends_with(TERMINALS) {
        text.push('.');
    }
    text
}

/// Normalize each blank-line separated paragraph on its own and rejoin them
/// with `"\n\n"` so paragraph boundaries survive for the segmenter.
pub fn normalize_paragraphs(text: &str) -> String {
    let paragraphs: Vec<String> = PARAGRAPH_BREAK
        .split(text)
        .filter(|p| !p.trim().is_empty())
        .map(normalize_text)
        .collect();

    if paragraphs.is_empty() {
        return normalize_text(text);
    }
    paragraphs.join("\n\n")
}

/// Whether the text contains anything the model can voice.
pub fn is_synthesizable(text: &str) -> bool {
    text.chars().any(char::is_alphanumeric)
}

fn tidy_spacing(text: &str) -> String {
    let collapsed = WHITESPACE.replace_all(text, " ");
    SPACE_BEFORE_PUNCT.replace_all(&collapsed, "$1").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_sentence_gets_period() {
        assert_eq!(normalize_text("Hello world"), "Hello world.");
        assert_eq!(normalize_text("Hello world!"), "Hello world!");
    }

    #[test]
    fn test_substitutions() {
        assert_eq!(
            normalize_text("\u{201C}Yes\u{201D} \u{2014} she said"),
            "\"Yes\" - she said."
        );
        assert_eq!(normalize_text("a/b|c#d"), "a b c d.");
        assert_eq!(normalize_text("snake_case"), "snake case.");
        assert_eq!(normalize_text("it\u{2019}s"), "it's.");
    }

    #[test]
    fn test_emoji_and_decorations_removed() {
        assert_eq!(normalize_text("Great job \u{1F600}\u{1F389}"), "Great job.");
        assert_eq!(normalize_text("I \u{2665} tea"), "I tea.");
    }

    #[test]
    fn test_expressions_expanded() {
        assert_eq!(normalize_text("me@home"), "me at home.");
        assert_eq!(
            normalize_text("fruit, e.g., apples"),
            "fruit, for example, apples."
        );
        assert_eq!(normalize_text("one, i.e., this"), "one, that is, this.");
    }

    #[test]
    fn test_space_before_punctuation_removed() {
        assert_eq!(normalize_text("Wait , what ?"), "Wait, what?");
    }

    #[test]
    fn test_repeated_quotes_collapsed() {
        assert_eq!(normalize_text("He said \"\"hi\"\""), "He said \"hi\"");
    }

    #[test]
    fn test_combining_marks_stripped() {
        // ê decomposes to e + U+0302 which is stripped
        assert_eq!(normalize_text("f\u{00EA}te"), "fete.");
    }

    #[test]
    fn test_degenerate_input() {
        assert_eq!(normalize_text(""), ".");
        assert_eq!(normalize_text("   \n\t"), ".");
        assert_eq!(normalize_text("\u{1F600}"), ".");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "Hello there. This is a test.",
            "  spaced   out , text ?  ",
            "Quotes \u{201C}\u{201C}doubled\u{201D}\u{201D} and ``ticks``",
            "me@home e.g., here",
            "caf\u{00E9} na\u{00EF}ve \u{2192} r\u{00E9}sum\u{00E9}",
            "\u{1F600} emoji only",
            "a '' b",
            "",
        ];
        for s in samples {
            let once = normalize_text(s);
            assert_eq!(normalize_text(&once), once, "input: {:?}", s);
        }
    }

    #[test]
    fn test_paragraphs_preserved() {
        let text = "First para\nstill first.\n\n\nSecond para";
        assert_eq!(
            normalize_paragraphs(text),
            "First para still first.\n\nSecond para."
        );
        let once = normalize_paragraphs(text);
        assert_eq!(normalize_paragraphs(&once), once);
    }

    #[test]
    fn test_is_synthesizable() {
        assert!(is_synthesizable("Hi."));
        assert!(is_synthesizable("42"));
        assert!(!is_synthesizable("."));
        assert!(!is_synthesizable("?! ..."));
    }
}
