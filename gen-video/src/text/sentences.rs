//! Paragraph and sentence boundary detection.

use regex::Regex;
use std::sync::OnceLock;

/// A blank line, optionally holding spaces or tabs.
static PARAGRAPH_BREAK: OnceLock<Regex> = OnceLock::new();

/// Whitespace directly after sentence-ending punctuation.
static SENTENCE_BREAK: OnceLock<Regex> = OnceLock::new();

fn paragraph_break() -> &'static Regex {
    PARAGRAPH_BREAK.get_or_init(|| {
        Regex::new(r"\n[ \t]*\n").expect("paragraph pattern should compile")
    })
}

fn sentence_break() -> &'static Regex {
    SENTENCE_BREAK.get_or_init(|| {
        Regex::new(r"[.!?]\s+").expect("sentence pattern should compile")
    })
}

/// Convert `\r\n` and lone `\r` line endings to `\n`.
pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Split newline-normalized text into trimmed, non-empty paragraphs.
pub fn split_into_paragraphs(text: &str) -> Vec<&str> {
    paragraph_break()
        .split(text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// Split a paragraph into sentences.
///
/// A boundary is a whitespace run preceded by `.`, `!` or `?`. The punctuation
/// stays with the sentence it ends.
pub fn split_into_sentences(paragraph: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for m in sentence_break().find_iter(paragraph) {
        // The punctuation mark is a single ASCII byte.
        sentences.push(&paragraph[start..m.start() + 1]);
        start = m.end();
    }
    sentences.push(&paragraph[start..]);

    sentences
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_line_endings() {
        assert_eq!(normalize_line_endings("a\r\nb\rc\n"), "a\nb\nc\n");
    }

    #[test]
    fn test_split_paragraphs() {
        let text = "First para.\n\nSecond para.\n  \t\nThird.\n\n\n\n";
        assert_eq!(
            split_into_paragraphs(text),
            vec!["First para.", "Second para.", "Third."]
        );
    }

    #[test]
    fn test_single_newline_keeps_paragraph() {
        let text = "Line one\nline two.";
        assert_eq!(split_into_paragraphs(text), vec!["Line one\nline two."]);
    }

    #[test]
    fn test_split_sentences_keeps_punctuation() {
        let sentences = split_into_sentences("Hello world. How are you? Fine!");
        assert_eq!(sentences, vec!["Hello world.", "How are you?", "Fine!"]);
    }

    #[test]
    fn test_punctuation_runs_stay_together() {
        let sentences = split_into_sentences("Really?! Yes... I think so.");
        assert_eq!(sentences, vec!["Really?!", "Yes...", "I think so."]);
    }

    #[test]
    fn test_no_break_without_whitespace() {
        let sentences = split_into_sentences("Version 1.5 is out.Next");
        assert_eq!(sentences, vec!["Version 1.5 is out.Next"]);
    }

    #[test]
    fn test_newline_counts_as_whitespace() {
        let sentences = split_into_sentences("One.\nTwo.");
        assert_eq!(sentences, vec!["One.", "Two."]);
    }

    #[test]
    fn test_empty_paragraph_has_no_sentences() {
        assert!(split_into_sentences("   ").is_empty());
    }
}
