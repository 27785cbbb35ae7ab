//! # Onboarding Buddy Core
//!
//! Domain types, traits, and error definitions for the Onboarding Buddy
//! assistant. This crate has **zero framework dependencies** — it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! External services (generation, embeddings) are reached through the
//! [`Provider`] trait defined here. Implementations live in
//! `buddy-providers`, which keeps the retrieval and prompt pipeline testable
//! with scripted providers.

pub mod error;
pub mod message;
pub mod profile;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use message::{ConversationMemory, Message, Role};
pub use profile::{UserProfile, sanitize};
pub use provider::{EmbeddingRequest, EmbeddingResponse, Provider, ProviderRequest, ProviderResponse};
