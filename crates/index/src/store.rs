//! In-memory vector index with JSON-lines persistence.
//!
//! Storage location: `<index_dir>/index.jsonl`, one [`IndexEntry`] per line.
//! Persisting is destructive: the whole directory is removed and recreated.

use crate::chunker::DocumentChunk;
use crate::vector::{ScoredChunk, rank};
use buddy_core::error::IndexError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const INDEX_FILE: &str = "index.jsonl";

/// One chunk with its embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub chunk: DocumentChunk,
    pub embedding: Vec<f32>,
}

/// Similarity-searchable store of embedded chunks, in document order.
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    pub fn new(entries: Vec<IndexEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// The `limit` chunks most similar to `query`, best first.
    pub fn search(&self, query: &[f32], limit: usize) -> Vec<ScoredChunk> {
        rank(
            self.entries
                .iter()
                .map(|e| (&e.chunk, e.embedding.as_slice())),
            query,
            limit,
        )
    }

    pub fn file_path(dir: &Path) -> PathBuf {
        dir.join(INDEX_FILE)
    }

    /// Replace `dir` with a fresh directory holding this index.
    pub fn persist(&self, dir: &Path) -> Result<(), IndexError> {
        if dir.exists() {
            std::fs::remove_dir_all(dir).map_err(|e| {
                IndexError::Storage(format!("Failed to remove {}: {e}", dir.display()))
            })?;
        }
        std::fs::create_dir_all(dir).map_err(|e| {
            IndexError::Storage(format!("Failed to create {}: {e}", dir.display()))
        })?;

        let mut content = String::new();
        for entry in &self.entries {
            let line = serde_json::to_string(entry).map_err(|e| {
                IndexError::Storage(format!("Failed to serialize index entry: {e}"))
            })?;
            content.push_str(&line);
            content.push('\n');
        }

        let path = Self::file_path(dir);
        std::fs::write(&path, &content).map_err(|e| {
            IndexError::Storage(format!("Failed to write {}: {e}", path.display()))
        })?;

        debug!(path = %path.display(), entries = self.entries.len(), "Index persisted");
        Ok(())
    }

    /// Load a previously persisted index. Corrupted lines are skipped.
    pub fn load(dir: &Path) -> Result<Self, IndexError> {
        let path = Self::file_path(dir);
        let content = std::fs::read_to_string(&path).map_err(|e| {
            IndexError::Storage(format!("Failed to read {}: {e}", path.display()))
        })?;

        let mut entries: Vec<IndexEntry> = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str::<IndexEntry>(line) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(error = %e, "Skipping corrupted index entry");
                    None
                }
            })
            .collect();
        entries.sort_by_key(|e| e.chunk.index);

        Ok(Self { entries })
    }
}
