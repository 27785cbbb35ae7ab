//! Knowledge index for Onboarding Buddy.
//!
//! Turns the induction document into overlapping chunks, embeds them through
//! the configured [`Provider`](buddy_core::Provider) and keeps them in a
//! cosine-similarity index persisted as JSON lines.
//!
//! The index is built at most once per process through [`KnowledgeBase`].

pub mod chunker;
pub mod document;
pub mod knowledge;
pub mod store;
pub mod vector;

pub use chunker::{DocumentChunk, RecursiveChunker};
pub use document::SourceDocument;
pub use knowledge::{IndexBuilder, KnowledgeBase};
pub use store::{IndexEntry, VectorIndex};
pub use vector::{ScoredChunk, cosine_similarity};
