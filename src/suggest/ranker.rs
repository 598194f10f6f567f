//! Suggestion ranking: the engine's sole entry point.
//!
//! For every chunk of the document and every catalog record, computes the
//! hybrid relevance score, drops pairs below the threshold or without usable
//! anchor text, keeps the best candidate per target URL, and returns the
//! survivors ordered by score.

use std::collections::HashMap;

use serde::Serialize;

use crate::catalog::CatalogRecord;
use crate::suggest::anchor::select_anchor;
use crate::suggest::chunker;
use crate::suggest::embeddings::EmbeddingProvider;
use crate::suggest::scoring::{self, ScoringWeights};

/// Maximum length of the context preview carried by a suggestion (chars).
const CONTEXT_PREVIEW_CHARS: usize = 150;

/// Coarse relevance bucket derived from the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    High,
    Medium,
    Low,
}

impl Tier {
    /// high >= 0.70, medium >= 0.50, everything else low.
    pub fn from_score(score: f32) -> Self {
        if score >= 0.70 {
            Tier::High
        } else if score >= 0.50 {
            Tier::Medium
        } else {
            Tier::Low
        }
    }
}

/// A scored, ranked candidate link, carrying everything a caller needs for
/// display.
#[derive(Debug, Clone, Serialize)]
pub struct Suggestion {
    /// Which chunk of the document this was generated from, 0-based.
    pub chunk_index: usize,
    /// The matched record's url.
    pub target_url: String,
    /// The matched record's title, for display.
    pub target_title: String,
    /// Literal text span chosen to carry the link.
    pub anchor_text: String,
    /// Hybrid relevance score in [0, 1].
    pub score: f32,
    pub tier: Tier,
    /// Leading excerpt of the source chunk, for display.
    pub context: String,
}

/// Errors surfaced before any scoring work begins. Low-scoring or
/// anchor-less pairs are filtered, never errored.
#[derive(Debug, thiserror::Error)]
pub enum SuggestError {
    #[error("threshold must be within [0.0, 1.0], got {0}")]
    ThresholdOutOfRange(f32),

    #[error("max_suggestions must be greater than zero")]
    ZeroMaxSuggestions,

    #[error("catalog record #{index} has an empty url")]
    RecordMissingUrl { index: usize },
}

/// The suggestion engine.
///
/// Holds a borrowed embedding capability plus scoring configuration; all
/// per-call state is local, so one suggester can serve any number of
/// independent [`rank`](Suggester::rank) calls.
pub struct Suggester<'a> {
    provider: &'a dyn EmbeddingProvider,
    weights: ScoringWeights,
    chunk_target_words: usize,
}

impl<'a> Suggester<'a> {
    pub fn new(provider: &'a dyn EmbeddingProvider) -> Self {
        Self {
            provider,
            weights: ScoringWeights::default(),
            chunk_target_words: chunker::DEFAULT_TARGET_WORDS,
        }
    }

    pub fn with_weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_chunk_target(mut self, target_words: usize) -> Self {
        self.chunk_target_words = target_words;
        self
    }

    /// Rank link suggestions for `document` against a catalog snapshot.
    ///
    /// Returns at most `max_suggestions` suggestions with score >=
    /// `threshold`, at most one per target URL, ordered by score descending
    /// (ties broken by lower chunk index). An empty result is a valid
    /// outcome, not a failure: empty documents, empty catalogs, and chunks
    /// that fail to encode all degrade to fewer (or zero) suggestions.
    pub fn rank(
        &self,
        document: &str,
        records: &[CatalogRecord],
        max_suggestions: usize,
        threshold: f32,
    ) -> Result<Vec<Suggestion>, SuggestError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(SuggestError::ThresholdOutOfRange(threshold));
        }
        if max_suggestions == 0 {
            return Err(SuggestError::ZeroMaxSuggestions);
        }
        for (index, record) in records.iter().enumerate() {
            if record.url.trim().is_empty() {
                return Err(SuggestError::RecordMissingUrl { index });
            }
        }

        if records.is_empty() {
            return Ok(vec![]);
        }

        let chunks = chunker::chunk_with_target(document, self.chunk_target_words);
        if chunks.is_empty() {
            return Ok(vec![]);
        }

        // Batch-encode everything once; encoding failures drop only the
        // affected texts.
        let chunk_texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let combined_texts: Vec<String> = records.iter().map(|r| r.combined_text()).collect();

        let chunk_vectors = self.encode_all(&chunk_texts, "chunk");
        let record_vectors = self.encode_all(&combined_texts, "record");

        let chunk_words: Vec<_> = chunk_texts
            .iter()
            .map(|t| scoring::significant_words(t))
            .collect();
        let record_words: Vec<_> = combined_texts
            .iter()
            .map(|t| scoring::significant_words(t))
            .collect();

        // Best candidate per target URL; ties keep the lower chunk index,
        // which is the one seen first in this iteration order.
        let mut best_by_url: HashMap<&str, Candidate> = HashMap::new();

        for (chunk, chunk_vector) in chunks.iter().zip(&chunk_vectors) {
            let Some(chunk_vector) = chunk_vector else {
                continue;
            };

            for (record_index, record) in records.iter().enumerate() {
                let Some(record_vector) = &record_vectors[record_index] else {
                    continue;
                };

                let score = scoring::score(
                    self.weights,
                    chunk_vector,
                    record_vector,
                    &chunk_words[chunk.index],
                    &record_words[record_index],
                );
                if score < threshold {
                    continue;
                }

                let anchor_text = select_anchor(chunk, record);
                if anchor_text.is_empty() {
                    continue;
                }

                let candidate = Candidate {
                    chunk_index: chunk.index,
                    record_index,
                    score,
                    anchor_text,
                };

                best_by_url
                    .entry(record.url.as_str())
                    .and_modify(|current| {
                        if score > current.score {
                            *current = candidate.clone();
                        }
                    })
                    .or_insert(candidate);
            }
        }

        let mut candidates: Vec<Candidate> = best_by_url.into_values().collect();
        candidates.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.chunk_index.cmp(&b.chunk_index))
                .then_with(|| a.record_index.cmp(&b.record_index))
        });
        candidates.truncate(max_suggestions);

        let suggestions = candidates
            .into_iter()
            .map(|candidate| {
                let record = &records[candidate.record_index];
                Suggestion {
                    chunk_index: candidate.chunk_index,
                    target_url: record.url.clone(),
                    target_title: record.title.clone(),
                    anchor_text: candidate.anchor_text,
                    score: candidate.score,
                    tier: Tier::from_score(candidate.score),
                    context: context_preview(&chunks[candidate.chunk_index].text),
                }
            })
            .collect();

        Ok(suggestions)
    }

    /// Encode all texts in one batch, falling back to per-text encoding when
    /// the batch fails so that only the offending entries are skipped.
    fn encode_all(&self, texts: &[String], kind: &str) -> Vec<Option<Vec<f32>>> {
        match self.provider.encode_batch(texts) {
            Ok(vectors) => vectors.into_iter().map(Some).collect(),
            Err(err) => {
                log::warn!("Batch {kind} encoding failed ({err}), retrying per text");
                texts
                    .iter()
                    .map(|text| match self.provider.encode(text) {
                        Ok(vector) => Some(vector),
                        Err(err) => {
                            log::debug!("Skipping unscoreable {kind}: {err}");
                            None
                        }
                    })
                    .collect()
            }
        }
    }
}

#[derive(Debug, Clone)]
struct Candidate {
    chunk_index: usize,
    record_index: usize,
    score: f32,
    anchor_text: String,
}

/// Leading excerpt of a chunk, truncated on a char boundary.
fn context_preview(text: &str) -> String {
    if text.chars().count() <= CONTEXT_PREVIEW_CHARS {
        return text.to_string();
    }
    let preview: String = text.chars().take(CONTEXT_PREVIEW_CHARS).collect();
    format!("{preview}...")
}
