//! Response generation.

use buddy_core::error::GenerationError;
use buddy_core::provider::{Provider, ProviderRequest};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Reply shown when generation fails.
pub const FALLBACK_REPLY: &str = "I'm sorry, I couldn't generate a response.";

/// A reply that is always displayable, with an optional error notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub text: String,
    pub notice: Option<String>,
}

pub struct ResponseGenerator {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
}

impl ResponseGenerator {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self::from_config(&buddy_config::GenerationConfig::default(), provider)
    }

    pub fn from_config(config: &buddy_config::GenerationConfig, provider: Arc<dyn Provider>) -> Self {
        Self {
            provider,
            model: config.model.clone(),
            temperature: config.temperature,
            top_p: config.top_p,
            max_tokens: config.max_tokens,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request(&self, prompt: &str) -> ProviderRequest {
        let mut request = ProviderRequest::single_turn(self.model.clone(), prompt);
        request.temperature = self.temperature;
        request.top_p = Some(self.top_p);
        request.max_tokens = Some(self.max_tokens);
        request.n = Some(1);
        request
    }

    pub async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        debug!(model = %self.model, prompt_chars = prompt.len(), "Generating reply");
        let response = self.provider.complete(self.request(prompt)).await?;
        let text = response.message.content.trim().to_string();
        if text.is_empty() {
            return Err(GenerationError::EmptyCompletion);
        }
        Ok(text)
    }

    /// Like [`generate`](Self::generate), but a failure becomes the fixed
    /// fallback reply plus a notice.
    pub async fn generate_or_fallback(&self, prompt: &str) -> Reply {
        match self.generate(prompt).await {
            Ok(text) => Reply { text, notice: None },
            Err(e) => {
                warn!(error = %e, "Generation failed, using fallback reply");
                Reply {
                    text: FALLBACK_REPLY.to_string(),
                    notice: Some(format!("Error generating response: {e}")),
                }
            }
        }
    }
}
