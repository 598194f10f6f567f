//! Hybrid relevance scoring between a chunk and a catalog record.
//!
//! The score blends two signals:
//! - cosine similarity between the chunk and record embeddings, clamped to
//!   [0, 1] (semantic opposition is not relevance)
//! - keyword overlap: the fraction of the record's significant vocabulary
//!   that also appears in the chunk
//!
//! The default 70/30 weighting is configuration, not contract.

use std::collections::HashSet;

/// Relative weights for the two scoring signals. Must sum to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    /// Weight of embedding cosine similarity.
    pub semantic: f32,
    /// Weight of keyword overlap.
    pub keyword: f32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            semantic: 0.7,
            keyword: 0.3,
        }
    }
}

const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "is", "are", "was", "were", "be", "been", "being", "in", "on", "at", "to",
    "for", "of", "with", "by", "from", "as", "and", "or", "but", "not", "no", "so", "if", "then",
];

/// Tokenize text into lowercase terms.
/// Filters out very short terms (1 char) and common stop words.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .map(|s| s.to_lowercase())
        .filter(|s| s.len() > 1 && !is_stop_word(s))
        .collect()
}

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

/// The distinct significant vocabulary of a text.
pub fn significant_words(text: &str) -> HashSet<String> {
    tokenize(text).into_iter().collect()
}

/// Fraction of the record's significant words that also appear in the chunk.
/// Returns 0 when the record has no significant words.
pub fn keyword_overlap(chunk_words: &HashSet<String>, record_words: &HashSet<String>) -> f32 {
    if record_words.is_empty() {
        return 0.0;
    }
    let shared = record_words.intersection(chunk_words).count();
    shared as f32 / record_words.len() as f32
}

/// Cosine similarity between two vectors. Zero-norm vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let norm_a = l2_norm(a);
    let norm_b = l2_norm(b);
    if norm_a < f32::EPSILON || norm_b < f32::EPSILON {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    dot_product / (norm_a * norm_b)
}

fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Hybrid relevance score in [0, 1] for one chunk/record pair.
///
/// Pure and deterministic given its inputs.
pub fn score(
    weights: ScoringWeights,
    chunk_vector: &[f32],
    record_vector: &[f32],
    chunk_words: &HashSet<String>,
    record_words: &HashSet<String>,
) -> f32 {
    let cos = cosine_similarity(chunk_vector, record_vector).clamp(0.0, 1.0);
    let kw = keyword_overlap(chunk_words, record_words);
    weights.semantic * cos + weights.keyword * kw
}
