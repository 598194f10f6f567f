//! Link suggestion engine.
//!
//! Matches chunks of input prose against a snapshot of catalog records and
//! produces ranked, deduplicated link suggestions with auto-selected anchor
//! text.
//!
//! # Architecture
//!
//! - `chunker`: splits a document into bounded-size prose chunks
//! - `embeddings`: embedding provider trait and the fastembed-backed model
//! - `scoring`: hybrid relevance scoring (cosine similarity + keyword overlap)
//! - `anchor`: anchor text selection for a matched chunk/record pair
//! - `ranker`: orchestrates scoring, thresholding, dedup and ordering

pub mod anchor;
pub mod chunker;
pub mod embeddings;
pub mod ranker;
pub mod scoring;

pub use chunker::Chunk;
pub use embeddings::{EmbeddingModel, EmbeddingProvider, EncodingError};
pub use ranker::{SuggestError, Suggester, Suggestion, Tier};
pub use scoring::ScoringWeights;
