//! Token-aware chunking for breaking documents into embeddable segments.
//!
//! Text is split by language-model tokens rather than characters so every
//! chunk fits the embedding model's context regardless of script or layout.

mod tokenizer;
mod window;

pub use tokenizer::{TiktokenCodec, TokenCodec};
pub use window::{TokenChunker, TokenWindows};

use crate::config::ChunkingSettings;
use crate::error::{Result, SkinsafeError};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A chunk of document text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentChunk {
    /// Decoded text of this chunk.
    pub content: String,
    /// Order of this chunk in the document.
    pub order: usize,
    /// Number of tokens in this chunk.
    pub token_count: usize,
}

/// Configuration for chunking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingConfig {
    /// Tokens per chunk.
    pub chunk_size: usize,
    /// Tokens shared between consecutive chunks.
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 800,
            overlap: 150,
        }
    }
}

impl From<&ChunkingSettings> for ChunkingConfig {
    fn from(settings: &ChunkingSettings) -> Self {
        Self {
            chunk_size: settings.chunk_size,
            overlap: settings.overlap,
        }
    }
}

impl ChunkingConfig {
    /// Reject configurations that cannot produce any chunk.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(SkinsafeError::Config(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Distance between consecutive window starts. Never zero.
    pub fn step(&self) -> usize {
        self.chunk_size.saturating_sub(self.overlap).max(1)
    }

    /// Token ranges covered by each window over a sequence of `token_count` tokens.
    ///
    /// The last window is the first one that reaches the end of the sequence.
    pub fn windows(&self, token_count: usize) -> impl Iterator<Item = Range<usize>> {
        let size = self.chunk_size;
        let step = self.step();
        (0..self.window_count(token_count)).map(move |i| {
            let start = i * step;
            start..(start + size).min(token_count)
        })
    }

    /// Number of windows produced for `token_count` tokens.
    pub fn window_count(&self, token_count: usize) -> usize {
        if token_count == 0 {
            0
        } else if token_count <= self.chunk_size {
            1
        } else {
            (token_count - self.chunk_size).div_ceil(self.step()) + 1
        }
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use super::TokenCodec;
    use crate::error::Result;

    /// One token per character.
    pub(crate) struct CharCodec;

    impl TokenCodec for CharCodec {
        fn encode(&self, text: &str) -> Vec<usize> {
            text.chars().map(|c| c as usize).collect()
        }

        fn decode(&self, tokens: &[usize]) -> Result<String> {
            Ok(tokens
                .iter()
                .filter_map(|&t| char::from_u32(t as u32))
                .collect())
        }
    }
}
