//! Text processing for TTS: sentence detection and word-bounded chunking.

pub mod chunker;
mod sentences;

pub use chunker::{chunk_document, DEFAULT_MAX_WORDS};

/// A chunk of text ready for TTS processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// 1-based position when the source split into several chunks,
    /// `None` when it produced exactly one
    pub position: Option<usize>,
    /// The text content
    pub text: String,
}

impl TextChunk {
    /// Create a new text chunk.
    pub fn new(position: Option<usize>, text: String) -> Self {
        Self { position, text }
    }

    /// Number of whitespace-separated words in the chunk.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}
