//! Index construction and the process-wide knowledge base.
//!
//! [`IndexBuilder`] runs the full pipeline: load the source document, chunk
//! it, embed the chunks in batches, and persist the result. [`KnowledgeBase`]
//! runs that pipeline at most once and hands every caller the same index.

use crate::chunker::RecursiveChunker;
use crate::document::SourceDocument;
use crate::store::{IndexEntry, VectorIndex};
use buddy_core::error::IndexError;
use buddy_core::provider::{EmbeddingRequest, Provider};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Builds a [`VectorIndex`] from the induction document.
pub struct IndexBuilder {
    provider: Arc<dyn Provider>,
    chunker: RecursiveChunker,
    embedding_model: String,
    batch_size: usize,
    source_document: PathBuf,
    index_dir: PathBuf,
}

impl IndexBuilder {
    pub fn new(
        provider: Arc<dyn Provider>,
        chunker: RecursiveChunker,
        embedding_model: impl Into<String>,
        source_document: impl Into<PathBuf>,
        index_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            provider,
            chunker,
            embedding_model: embedding_model.into(),
            batch_size: 64,
            source_document: source_document.into(),
            index_dir: index_dir.into(),
        }
    }

    pub fn from_config(
        config: &buddy_config::AppConfig,
        provider: Arc<dyn Provider>,
    ) -> Result<Self, IndexError> {
        let chunker = RecursiveChunker::from_config(&config.chunking)?;
        Ok(Self::new(
            provider,
            chunker,
            config.retrieval.embedding_model.clone(),
            config.paths.source_document.clone(),
            config.paths.index_dir.clone(),
        )
        .with_batch_size(config.retrieval.embed_batch_size))
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn index_dir(&self) -> &std::path::Path {
        &self.index_dir
    }

    /// Load, chunk, embed and persist. Replaces any previous on-disk index.
    pub async fn build(&self) -> Result<VectorIndex, IndexError> {
        let document = SourceDocument::load(&self.source_document)?;
        let chunks = self.chunker.chunk(&document.full_text());

        info!(
            source = %self.source_document.display(),
            chunks = chunks.len(),
            chunk_size = self.chunker.chunk_size(),
            "Building knowledge index"
        );

        let mut entries = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(self.batch_size) {
            let request = EmbeddingRequest {
                model: self.embedding_model.clone(),
                inputs: batch.iter().map(|c| c.text.clone()).collect(),
            };
            let response = self
                .provider
                .embed(request)
                .await
                .map_err(|e| IndexError::EmbeddingFailed(e.to_string()))?;

            if response.embeddings.len() != batch.len() {
                return Err(IndexError::EmbeddingFailed(format!(
                    "Expected {} embeddings, got {}",
                    batch.len(),
                    response.embeddings.len()
                )));
            }

            entries.extend(
                batch
                    .iter()
                    .cloned()
                    .zip(response.embeddings)
                    .map(|(chunk, embedding)| IndexEntry { chunk, embedding }),
            );
            debug!(embedded = entries.len(), total = chunks.len(), "Embedded batch");
        }

        let index = VectorIndex::new(entries);
        index.persist(&self.index_dir)?;

        info!(
            entries = index.len(),
            dir = %self.index_dir.display(),
            "Knowledge index ready"
        );
        Ok(index)
    }
}

/// Lazily built, shared knowledge index.
///
/// The first caller of [`KnowledgeBase::index`] builds; concurrent callers
/// wait for that build; later callers get the same `Arc`. A failed build
/// leaves the knowledge base unbuilt so the next call retries.
pub struct KnowledgeBase {
    builder: Option<IndexBuilder>,
    cell: OnceCell<Arc<VectorIndex>>,
}

impl KnowledgeBase {
    pub fn new(builder: IndexBuilder) -> Self {
        Self {
            builder: Some(builder),
            cell: OnceCell::new(),
        }
    }

    /// A knowledge base around an index that is already built.
    pub fn preloaded(index: VectorIndex) -> Self {
        Self {
            builder: None,
            cell: OnceCell::new_with(Some(Arc::new(index))),
        }
    }

    /// Return the index, building it on first use.
    pub async fn index(&self) -> Result<Arc<VectorIndex>, IndexError> {
        self.cell
            .get_or_try_init(|| async {
                let builder = self.builder.as_ref().ok_or_else(|| {
                    IndexError::Storage("No index builder configured".into())
                })?;
                builder.build().await.map(Arc::new)
            })
            .await
            .cloned()
    }

    pub fn is_built(&self) -> bool {
        self.cell.initialized()
    }
}
