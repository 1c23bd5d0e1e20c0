//! Text chunking for TTS processing.

use super::sentences::{normalize_line_endings, split_into_paragraphs, split_into_sentences};
use super::TextChunk;

/// Default maximum chunk size in words.
pub const DEFAULT_MAX_WORDS: usize = 100;

/// Split text into chunks of at most `max_words` words.
///
/// Whole sentences are packed greedily and paragraph breaks always end a
/// sentence. A sentence longer than `max_words` is cut into fixed windows of
/// `max_words` words. Words are never dropped, duplicated or reordered.
///
/// # Arguments
/// * `text` - The text to chunk
/// * `max_words` - Word limit per chunk (a limit of 0 is treated as 1)
///
/// # Returns
/// Chunks in source order. Empty or whitespace-only text yields no chunks.
pub fn split_text(text: &str, max_words: usize) -> Vec<String> {
    let max_words = max_words.max(1);
    let normalized = normalize_line_endings(text);

    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut word_count = 0;

    for paragraph in split_into_paragraphs(&normalized) {
        for sentence in split_into_sentences(paragraph) {
            let words: Vec<&str> = sentence.split_whitespace().collect();
            let n = words.len();
            if n == 0 {
                continue;
            }

            if n > max_words {
                // Flush current chunk first
                if !current.is_empty() {
                    chunks.push(current.join(" "));
                    current.clear();
                    word_count = 0;
                }

                for window in words.chunks(max_words) {
                    chunks.push(window.join(" "));
                }
                continue;
            }

            if word_count + n > max_words && !current.is_empty() {
                chunks.push(current.join(" "));
                current.clear();
                word_count = 0;
            }
            current.push(sentence);
            word_count += n;
        }
    }

    if !current.is_empty() {
        chunks.push(current.join(" "));
    }

    chunks
}

/// Chunk a document and number the pieces for output naming.
///
/// A document that fits in one chunk gets no position; otherwise positions
/// run from 1.
pub fn chunk_document(text: &str, max_words: usize) -> Vec<TextChunk> {
    let raw_chunks = split_text(text, max_words);
    let single = raw_chunks.len() == 1;

    raw_chunks
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            let position = if single { None } else { Some(i + 1) };
            TextChunk::new(position, text)
        })
        .collect()
}
