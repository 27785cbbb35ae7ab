//! Error types for the Onboarding Buddy domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use std::path::PathBuf;
use thiserror::Error;

/// The top-level error type for all Onboarding Buddy operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Index errors ---
    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    // --- Retrieval errors ---
    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    // --- Generation errors ---
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    // --- Transcript errors ---
    #[error("Transcript error: {0}")]
    Transcript(#[from] TranscriptError),

    // --- Session gate errors ---
    #[error("{0}")]
    Gate(#[from] GateError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Failures while loading the source document or building the index.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Source document unavailable at {path}: {reason}")]
    SourceUnavailable { path: PathBuf, reason: String },

    #[error("Source document at {path} could not be parsed: {reason}")]
    InvalidSource { path: PathBuf, reason: String },

    #[error("Index storage error: {0}")]
    Storage(String),

    #[error("Embedding generation failed: {0}")]
    EmbeddingFailed(String),

    #[error("Invalid chunking parameters: {0}")]
    InvalidChunking(String),
}

/// Failures while producing a retrieved context for one question.
///
/// An empty but successful retrieval is not an error; see
/// `RetrievedContext::empty` in `buddy-agent`.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("Context index unavailable: {0}")]
    IndexUnavailable(String),

    #[error("Query embedding failed: {0}")]
    Embedding(ProviderError),

    #[error("Context synthesis failed: {0}")]
    Synthesis(ProviderError),
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("{0}")]
    Provider(#[from] ProviderError),

    #[error("Provider returned an empty completion")]
    EmptyCompletion,
}

#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("Failed to write transcript {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    #[error("Failed to read transcript {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },
}

/// Input validation errors raised by the session gate.
///
/// Messages are user-facing; they are shown inline by the front ends.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    #[error("Incorrect password!")]
    IncorrectPassword,

    #[error("Please fill in all fields!")]
    IncompleteProfile,

    #[error("Enter the password and your details before chatting")]
    Locked,

    #[error("Details already submitted; go back to edit them")]
    ProfileSubmitted,

    #[error("Question must not be empty")]
    EmptyQuestion,
}
