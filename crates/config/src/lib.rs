//! Configuration loading, validation, and management for Onboarding Buddy.
//!
//! Loads configuration from `~/.onboarding-buddy/config.toml` (or an explicit
//! path) with environment variable overrides. Validates all settings at
//! startup; missing secrets are reported through [`AppConfig::require_secrets`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.onboarding-buddy/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the generation and embedding services
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Shared access password for the entry gate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_password: Option<String>,

    /// Service endpoint settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Answer generation settings
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Retrieval (embedding search + synthesis) settings
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Document chunking settings
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Filesystem locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Assistant persona used in the prompt
    #[serde(default)]
    pub persona: PersonaConfig,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("access_password", &redact(&self.access_password))
            .field("provider", &self.provider)
            .field("generation", &self.generation)
            .field("retrieval", &self.retrieval)
            .field("chunking", &self.chunking)
            .field("paths", &self.paths)
            .field("persona", &self.persona)
            .field("gateway", &self.gateway)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider name, used for logging
    #[serde(default = "default_provider_name")]
    pub name: String,

    /// Base URL of the OpenAI-compatible API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_provider_name() -> String {
    "openai".into()
}
fn default_api_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_timeout_secs() -> u64 {
    120
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: default_provider_name(),
            api_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_chat_model")]
    pub model: String,

    #[serde(default)]
    pub temperature: f32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_chat_model() -> String {
    "gpt-4o-mini".into()
}
fn default_top_p() -> f32 {
    1.0
}
fn default_max_tokens() -> u32 {
    1024
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: default_chat_model(),
            temperature: 0.0,
            top_p: default_top_p(),
            max_tokens: default_max_tokens(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Model that condenses the retrieved chunks into a context string
    #[serde(default = "default_chat_model")]
    pub synthesis_model: String,

    #[serde(default = "default_synthesis_temperature")]
    pub synthesis_temperature: f32,

    /// Number of nearest chunks passed to synthesis
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Chunks per embedding request during index build
    #[serde(default = "default_embed_batch_size")]
    pub embed_batch_size: usize,
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".into()
}
fn default_synthesis_temperature() -> f32 {
    0.7
}
fn default_top_k() -> usize {
    20
}
fn default_embed_batch_size() -> usize {
    64
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            embedding_model: default_embedding_model(),
            synthesis_model: default_chat_model(),
            synthesis_temperature: default_synthesis_temperature(),
            top_k: default_top_k(),
            embed_batch_size: default_embed_batch_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Target chunk length in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters shared between consecutive chunks
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

fn default_chunk_size() -> usize {
    500
}
fn default_chunk_overlap() -> usize {
    50
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// The induction document (JSON paragraph list or plain text)
    #[serde(default = "default_source_document")]
    pub source_document: PathBuf,

    /// Directory holding the persisted vector index; wiped on rebuild
    #[serde(default = "default_index_dir")]
    pub index_dir: PathBuf,

    /// Directory holding the daily chat transcripts
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

fn default_source_document() -> PathBuf {
    PathBuf::from("induction_kit.json")
}
fn default_index_dir() -> PathBuf {
    PathBuf::from("Database")
}
fn default_log_dir() -> PathBuf {
    PathBuf::from("log")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source_document: default_source_document(),
            index_dir: default_index_dir(),
            log_dir: default_log_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaConfig {
    #[serde(default = "default_assistant_name")]
    pub assistant_name: String,

    /// Who the assistant behaves like, completing "you are behaving like …"
    #[serde(default = "default_character")]
    pub character: String,
}

fn default_assistant_name() -> String {
    "Bob".into()
}
fn default_character() -> String {
    "a friendly Human Resource Group colleague who is welcoming a new joiner to the division".into()
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            assistant_name: default_assistant_name(),
            character: default_character(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    8501
}
fn default_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

/// Secrets that must be present before the assistant can start.
#[derive(Clone)]
pub struct Secrets {
    pub api_key: String,
    pub access_password: String,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("api_key", &"[REDACTED]")
            .field("access_password", &"[REDACTED]")
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.onboarding-buddy/config.toml).
    ///
    /// Environment variables override file values:
    /// - `ONBOARDING_BUDDY_API_KEY`, then `OPENAI_API_KEY`
    /// - `ONBOARDING_BUDDY_PASSWORD`
    /// - `ONBOARDING_BUDDY_MODEL`
    /// - `ONBOARDING_BUDDY_DOCUMENT`
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_override(None)
    }

    /// Load from `path` when given, otherwise from the default location.
    pub fn load_with_override(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_dir().join("config.toml"),
        };
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup`, which maps a variable
    /// name to its value.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("ONBOARDING_BUDDY_API_KEY").or_else(|| lookup("OPENAI_API_KEY")) {
            self.api_key = Some(key);
        }
        if let Some(password) = lookup("ONBOARDING_BUDDY_PASSWORD") {
            self.access_password = Some(password);
        }
        if let Some(model) = lookup("ONBOARDING_BUDDY_MODEL") {
            self.generation.model = model;
        }
        if let Some(document) = lookup("ONBOARDING_BUDDY_DOCUMENT") {
            self.paths.source_document = PathBuf::from(document);
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".onboarding-buddy")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(ConfigError::ValidationError(
                "generation.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if !(self.generation.top_p > 0.0 && self.generation.top_p <= 1.0) {
            return Err(ConfigError::ValidationError(
                "generation.top_p must be in (0.0, 1.0]".into(),
            ));
        }

        if self.chunking.chunk_size == 0 {
            return Err(ConfigError::ValidationError(
                "chunking.chunk_size must be > 0".into(),
            ));
        }

        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(ConfigError::ValidationError(format!(
                "chunking.chunk_overlap ({}) must be smaller than chunking.chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }

        if self.retrieval.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval.top_k must be > 0".into(),
            ));
        }

        if self.retrieval.embed_batch_size == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval.embed_batch_size must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// The API key, which indexing and answering both need.
    pub fn require_api_key(&self) -> Result<String, ConfigError> {
        self.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingSecret("api_key"))
    }

    /// Return both secrets, or the first one that is missing.
    pub fn require_secrets(&self) -> Result<Secrets, ConfigError> {
        let api_key = self.require_api_key()?;
        let access_password = self
            .access_password
            .clone()
            .filter(|p| !p.is_empty())
            .ok_or(ConfigError::MissingSecret("access_password"))?;
        Ok(Secrets {
            api_key,
            access_password,
        })
    }

    /// Fail when the induction document is missing.
    pub fn require_source_document(&self) -> Result<&Path, ConfigError> {
        let path = self.paths.source_document.as_path();
        if path.is_file() {
            Ok(path)
        } else {
            Err(ConfigError::MissingSourceDocument(path.to_path_buf()))
        }
    }

    /// Generate a default config TOML string (for the `init` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            access_password: None,
            provider: ProviderConfig::default(),
            generation: GenerationConfig::default(),
            retrieval: RetrievalConfig::default(),
            chunking: ChunkingConfig::default(),
            paths: PathsConfig::default(),
            persona: PersonaConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("Missing secret `{0}` (set it in the config file or the environment)")]
    MissingSecret(&'static str),

    #[error("Induction document not found at {0}")]
    MissingSourceDocument(PathBuf),
}
