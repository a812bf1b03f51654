//! Similarity scoring utilities for the knowledge index.
//!
//! Pure-Rust implementations of:
//! - Cosine similarity over embedding vectors
//! - Keyword-overlap scoring (used when no embedding model is configured)
//! - Top-k ranking of stored documents by either score

use std::collections::HashSet;

/// A document held by the in-process index.
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub id: String,
    pub text: String,
    pub embedding: Option<Vec<f32>>,
}

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1] where 1 = identical, 0 = orthogonal, -1 = opposite.
/// Returns 0.0 if either vector is zero-length or empty.
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

/// Lowercased alphanumeric terms of at least two characters.
fn terms(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 2)
        .map(str::to_lowercase)
        .collect()
}

/// Fraction of the query's distinct terms that occur in `text`, in [0, 1].
pub fn keyword_score(query: &str, text: &str) -> f32 {
    let query_terms = terms(query);
    if query_terms.is_empty() {
        return 0.0;
    }
    let text_terms = terms(text);
    let hits = query_terms.iter().filter(|t| text_terms.contains(*t)).count();
    hits as f32 / query_terms.len() as f32
}

/// Rank documents by cosine similarity to a query embedding.
///
/// Documents without an embedding are skipped. Ties keep insertion order.
pub fn rank_by_embedding<'a>(
    docs: &'a [StoredDocument],
    query_embedding: &[f32],
    limit: usize,
) -> Vec<(f32, &'a StoredDocument)> {
    let scored = docs
        .iter()
        .filter_map(|doc| {
            let emb = doc.embedding.as_ref()?;
            Some((cosine_similarity(emb, query_embedding), doc))
        })
        .collect();
    top_k(scored, limit)
}

/// Rank documents by keyword overlap with the query.
///
/// Documents sharing no term with the query are excluded.
pub fn rank_by_keywords<'a>(
    docs: &'a [StoredDocument],
    query: &str,
    limit: usize,
) -> Vec<(f32, &'a StoredDocument)> {
    let scored = docs
        .iter()
        .map(|doc| (keyword_score(query, &doc.text), doc))
        .filter(|(score, _)| *score > 0.0)
        .collect();
    top_k(scored, limit)
}

fn top_k(
    mut scored: Vec<(f32, &StoredDocument)>,
    limit: usize,
) -> Vec<(f32, &StoredDocument)> {
    // stable sort: equal scores stay in insertion order
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(limit);
    scored
}
