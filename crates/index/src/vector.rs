//! Vector similarity utilities.

use crate::chunker::DocumentChunk;
use serde::{Deserialize, Serialize};

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1] where 1 = identical, 0 = orthogonal, -1 = opposite.
/// Returns 0.0 if the lengths differ or either vector is empty or zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        return 0.0;
    }

    (dot / denom) as f32
}

/// A chunk returned by a similarity search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: DocumentChunk,
    pub score: f32,
}

/// Rank `(chunk, embedding)` pairs by cosine similarity to `query`.
///
/// Results are sorted by descending score and truncated to `limit`. The sort
/// is stable, so equal scores keep document order.
pub fn rank<'a, I>(entries: I, query: &[f32], limit: usize) -> Vec<ScoredChunk>
where
    I: IntoIterator<Item = (&'a DocumentChunk, &'a [f32])>,
{
    let mut scored: Vec<ScoredChunk> = entries
        .into_iter()
        .map(|(chunk, embedding)| ScoredChunk {
            chunk: chunk.clone(),
            score: cosine_similarity(embedding, query),
        })
        .collect();

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(limit);
    scored
}
