//! Shared test helpers for pipeline tests.

use buddy_core::error::ProviderError;
use buddy_core::message::Message;
use buddy_core::provider::{
    EmbeddingRequest, EmbeddingResponse, Provider, ProviderRequest, ProviderResponse, Usage,
};
use buddy_index::{DocumentChunk, IndexEntry, KnowledgeBase, VectorIndex};
use std::sync::Mutex;

/// A mock provider that returns a sequence of scripted completions.
///
/// Each call to `complete` returns the next scripted result and records the
/// request. Embeddings are letter-frequency vectors, so similar words land
/// near each other.
pub struct ScriptedProvider {
    responses: Mutex<Vec<Result<String, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
    fail_embeddings: bool,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
            fail_embeddings: false,
        }
    }

    pub fn texts(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(t.to_string())).collect())
    }

    pub fn failing_embeddings(mut self) -> Self {
        self.fail_embeddings = true;
        self
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.requests.lock().unwrap().push(request);
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            panic!("ScriptedProvider: no more responses");
        }
        responses.remove(0).map(|text| make_text_response(&text))
    }

    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, ProviderError> {
        if self.fail_embeddings {
            return Err(ProviderError::Network("embedding service unreachable".into()));
        }
        Ok(EmbeddingResponse {
            embeddings: request.inputs.iter().map(|t| letters(t)).collect(),
            model: request.model,
            usage: None,
        })
    }
}

pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// Letter-frequency embedding.
pub fn letters(text: &str) -> Vec<f32> {
    let mut v = vec![0.0; 26];
    for c in text.to_ascii_lowercase().chars() {
        if c.is_ascii_lowercase() {
            v[(c as u8 - b'a') as usize] += 1.0;
        }
    }
    v
}

/// A built knowledge base over `texts`, embedded with [`letters`].
pub fn knowledge_over(texts: &[&str]) -> KnowledgeBase {
    let entries = texts
        .iter()
        .enumerate()
        .map(|(index, text)| IndexEntry {
            chunk: DocumentChunk {
                index,
                text: text.to_string(),
            },
            embedding: letters(text),
        })
        .collect();
    KnowledgeBase::preloaded(VectorIndex::new(entries))
}
