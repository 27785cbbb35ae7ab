//! Context retrieval.
//!
//! Embeds the question, pulls the nearest chunks from the knowledge base and
//! has the synthesis model condense them into a single context passage.

use buddy_core::error::RetrievalError;
use buddy_core::provider::{EmbeddingRequest, Provider, ProviderRequest};
use buddy_index::{KnowledgeBase, ScoredChunk};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Context derived from the chunks nearest to one question.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RetrievedContext {
    /// Synthesised answer-context passed to the prompt
    pub text: String,
    /// The chunks the text was derived from, best first
    pub sources: Vec<ScoredChunk>,
}

impl RetrievedContext {
    /// Nothing relevant was found.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

pub struct ContextRetriever {
    knowledge: Arc<KnowledgeBase>,
    provider: Arc<dyn Provider>,
    embedding_model: String,
    synthesis_model: String,
    synthesis_temperature: f32,
    top_k: usize,
}

impl ContextRetriever {
    pub fn new(knowledge: Arc<KnowledgeBase>, provider: Arc<dyn Provider>) -> Self {
        let defaults = buddy_config::RetrievalConfig::default();
        Self {
            knowledge,
            provider,
            embedding_model: defaults.embedding_model,
            synthesis_model: defaults.synthesis_model,
            synthesis_temperature: defaults.synthesis_temperature,
            top_k: defaults.top_k,
        }
    }

    pub fn from_config(
        config: &buddy_config::RetrievalConfig,
        knowledge: Arc<KnowledgeBase>,
        provider: Arc<dyn Provider>,
    ) -> Self {
        Self {
            knowledge,
            provider,
            embedding_model: config.embedding_model.clone(),
            synthesis_model: config.synthesis_model.clone(),
            synthesis_temperature: config.synthesis_temperature,
            top_k: config.top_k,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn knowledge(&self) -> &Arc<KnowledgeBase> {
        &self.knowledge
    }

    pub async fn retrieve(&self, question: &str) -> Result<RetrievedContext, RetrievalError> {
        let index = self.knowledge.index().await.map_err(|e| {
            warn!(error = %e, "Knowledge index unavailable");
            RetrievalError::IndexUnavailable(e.to_string())
        })?;
        if index.is_empty() {
            return Ok(RetrievedContext::empty());
        }

        let query = self
            .provider
            .embed(EmbeddingRequest {
                model: self.embedding_model.clone(),
                inputs: vec![question.to_string()],
            })
            .await
            .map_err(RetrievalError::Embedding)?;

        let Some(query_embedding) = query.embeddings.into_iter().next() else {
            return Err(RetrievalError::Embedding(
                buddy_core::error::ProviderError::ApiError {
                    status_code: 200,
                    message: "No embedding returned for question".into(),
                },
            ));
        };

        let hits = index.search(&query_embedding, self.top_k);
        debug!(hits = hits.len(), top_k = self.top_k, "Similarity search complete");
        if hits.is_empty() {
            return Ok(RetrievedContext::empty());
        }

        let mut request = ProviderRequest::single_turn(
            self.synthesis_model.clone(),
            stuff_prompt(&hits, question),
        );
        request.temperature = self.synthesis_temperature;

        let response = self
            .provider
            .complete(request)
            .await
            .map_err(RetrievalError::Synthesis)?;

        Ok(RetrievedContext {
            text: response.message.content,
            sources: hits,
        })
    }
}

/// Place every retrieved chunk into one question-answering prompt.
pub fn stuff_prompt(hits: &[ScoredChunk], question: &str) -> String {
    let context = hits
        .iter()
        .map(|h| h.chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    format!(
        "Use the following pieces of context to answer the question at the end. \
         If you don't know the answer, just say that you don't know, don't try to make up an answer.\
         \n\n{context}\n\nQuestion: {question}\nHelpful Answer:"
    )
}
