//! Provider construction from configuration.

use crate::openai_compat::OpenAiCompatProvider;
use buddy_core::provider::Provider;
use std::sync::Arc;
use std::time::Duration;

/// Build the configured provider, authenticated with `api_key`.
///
/// An empty `provider.api_url` falls back to the well-known URL for
/// `provider.name`.
pub fn build_from_config(config: &buddy_config::AppConfig, api_key: &str) -> Arc<dyn Provider> {
    let name = &config.provider.name;
    let base_url = if config.provider.api_url.trim().is_empty() {
        default_base_url(name)
    } else {
        config.provider.api_url.clone()
    };

    tracing::debug!(provider = %name, base_url = %base_url, "Building provider");

    Arc::new(OpenAiCompatProvider::with_timeout(
        name.as_str(),
        base_url,
        api_key,
        Duration::from_secs(config.provider.timeout_secs),
    ))
}

/// Get the default base URL for well-known providers.
fn default_base_url(provider_name: &str) -> String {
    match provider_name {
        "openai" => "https://api.openai.com/v1".into(),
        "openrouter" => "https://openrouter.ai/api/v1".into(),
        "ollama" => "http://localhost:11434/v1".into(),
        "vllm" => "http://localhost:8000/v1".into(),
        _ => "https://api.openai.com/v1".into(),
    }
}
