//! Recursive character splitter.
//!
//! A thin layer over [`text_splitter::TextSplitter`]. Text is split on the
//! coarsest boundary that fits (paragraph, line, sentence, word, then single
//! characters) and packed up to `chunk_size` characters, with up to
//! `chunk_overlap` trailing characters repeated at the start of the next
//! chunk.

use buddy_core::error::IndexError;
use serde::{Deserialize, Serialize};
use text_splitter::{Characters, ChunkConfig, TextSplitter};

/// A contiguous slice of the source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentChunk {
    /// Position of the chunk in document order
    pub index: usize,
    pub text: String,
}

pub struct RecursiveChunker {
    chunk_size: usize,
    chunk_overlap: usize,
    splitter: TextSplitter<Characters>,
}

impl RecursiveChunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, IndexError> {
        if chunk_size == 0 {
            return Err(IndexError::InvalidChunking("chunk_size must be > 0".into()));
        }
        if chunk_overlap >= chunk_size {
            return Err(IndexError::InvalidChunking(format!(
                "chunk_overlap ({chunk_overlap}) must be smaller than chunk_size ({chunk_size})"
            )));
        }
        let config = ChunkConfig::new(chunk_size)
            .with_overlap(chunk_overlap)
            .map_err(|e| IndexError::InvalidChunking(e.to_string()))?;
        Ok(Self {
            chunk_size,
            chunk_overlap,
            splitter: TextSplitter::new(config),
        })
    }

    pub fn from_config(config: &buddy_config::ChunkingConfig) -> Result<Self, IndexError> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split `text` into ordered, trimmed, non-empty chunks.
    pub fn chunk(&self, text: &str) -> Vec<DocumentChunk> {
        self.splitter
            .chunks(text)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .enumerate()
            .map(|(index, text)| DocumentChunk {
                index,
                text: text.to_string(),
            })
            .collect()
    }
}

impl std::fmt::Debug for RecursiveChunker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecursiveChunker")
            .field("chunk_size", &self.chunk_size)
            .field("chunk_overlap", &self.chunk_overlap)
            .finish_non_exhaustive()
    }
}
