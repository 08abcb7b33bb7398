//! Sliding token window chunker.

use super::{ChunkingConfig, ContentChunk, TokenCodec};
use crate::error::Result;
use std::ops::Range;
use std::sync::Arc;
use tracing::debug;

/// Splits text into overlapping windows of tokens.
pub struct TokenChunker {
    codec: Arc<dyn TokenCodec>,
    config: ChunkingConfig,
}

impl TokenChunker {
    /// Create a chunker. Fails if the configuration cannot produce chunks.
    pub fn new(codec: Arc<dyn TokenCodec>, config: ChunkingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { codec, config })
    }

    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    /// Tokenize `text` once and return a single-pass iterator over its chunks.
    pub fn chunks(&self, text: &str) -> TokenWindows<'_> {
        let tokens = self.codec.encode(text);
        let ranges: Vec<Range<usize>> = self.config.windows(tokens.len()).collect();
        debug!(
            "Chunking {} tokens into {} windows (size {}, overlap {})",
            tokens.len(),
            ranges.len(),
            self.config.chunk_size,
            self.config.overlap
        );

        TokenWindows {
            codec: self.codec.as_ref(),
            tokens,
            ranges: ranges.into_iter().enumerate(),
        }
    }

    /// Collect every chunk of `text`.
    pub fn chunk_text(&self, text: &str) -> Result<Vec<ContentChunk>> {
        self.chunks(text).collect()
    }
}

/// Iterator over decoded token windows.
pub struct TokenWindows<'a> {
    codec: &'a dyn TokenCodec,
    tokens: Vec<usize>,
    ranges: std::iter::Enumerate<std::vec::IntoIter<Range<usize>>>,
}

impl TokenWindows<'_> {
    /// Total number of tokens in the source text.
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }
}

impl Iterator for TokenWindows<'_> {
    type Item = Result<ContentChunk>;

    fn next(&mut self) -> Option<Self::Item> {
        let (order, range) = self.ranges.next()?;
        let window = &self.tokens[range];
        Some(self.codec.decode(window).map(|content| ContentChunk {
            content,
            order,
            token_count: window.len(),
        }))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ranges.size_hint()
    }
}

impl ExactSizeIterator for TokenWindows<'_> {}
