//! Embedding provider abstraction and the fastembed-backed implementation.
//!
//! The suggestion ranker only sees the [`EmbeddingProvider`] trait, so the
//! expensive model is constructed once by the caller and injected; tests use
//! a deterministic in-memory provider instead.

use fastembed::{InitOptions, TextEmbedding};
use std::path::PathBuf;
use std::sync::Mutex;

/// Error type for embedding operations.
///
/// Failures are scoped to the offending text: callers skip the affected
/// chunk or record and keep going rather than aborting the analysis.
#[derive(Debug, thiserror::Error)]
pub enum EncodingError {
    #[error("Model initialization failed: {0}")]
    InitFailed(String),

    #[error("Embedding generation failed: {0}")]
    EncodingFailed(String),

    #[error("Invalid model name: {0}")]
    InvalidModel(String),

    #[error("Text has no embeddable content")]
    EmptyText,
}

/// Capability for mapping text to fixed-length dense vectors.
///
/// Vectors from two different providers (or model versions) are not
/// comparable. Implementations must be deterministic: identical text always
/// yields an identical vector.
pub trait EmbeddingProvider: Send + Sync {
    /// Encode a single text.
    fn encode(&self, text: &str) -> Result<Vec<f32>, EncodingError>;

    /// Encode a batch of texts, order-preserving, same length as the input.
    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EncodingError>;

    /// Embedding dimensions produced by this provider.
    fn dimensions(&self) -> usize;
}

/// Wrapper around fastembed's TextEmbedding model.
/// Uses a Mutex because fastembed's embed() requires &mut self.
pub struct EmbeddingModel {
    model: Mutex<TextEmbedding>,
    model_name: String,
    dimensions: usize,
}

impl EmbeddingModel {
    /// Create a new embedding model with the given name.
    ///
    /// The model is downloaded on first use if not cached. Models are cached
    /// in the `models/` subdirectory of `cache_dir`.
    pub fn new(model_name: &str, cache_dir: PathBuf) -> Result<Self, EncodingError> {
        let model_enum = Self::parse_model_name(model_name)?;

        let models_dir = cache_dir.join("models");
        std::fs::create_dir_all(&models_dir).map_err(|e| {
            EncodingError::InitFailed(format!("Failed to create models directory: {}", e))
        })?;

        let options = InitOptions::new(model_enum)
            .with_cache_dir(models_dir)
            .with_show_download_progress(true);

        let mut model = TextEmbedding::try_new(options)
            .map_err(|e| EncodingError::InitFailed(e.to_string()))?;

        let dimensions = Self::probe_dimensions(&mut model)?;

        log::info!("Loaded embedding model '{model_name}' ({dimensions} dimensions)");

        Ok(Self {
            model: Mutex::new(model),
            model_name: model_name.to_string(),
            dimensions,
        })
    }

    /// Get the model name.
    pub fn name(&self) -> &str {
        &self.model_name
    }

    /// Parse model name string to fastembed enum.
    fn parse_model_name(name: &str) -> Result<fastembed::EmbeddingModel, EncodingError> {
        match name.to_lowercase().as_str() {
            "all-minilm-l6-v2" | "allminiml6v2" => Ok(fastembed::EmbeddingModel::AllMiniLML6V2),
            "all-minilm-l6-v2-q" | "allminiml6v2q" => Ok(fastembed::EmbeddingModel::AllMiniLML6V2Q),
            "bge-small-en-v1.5" | "bgesmallenv15" => Ok(fastembed::EmbeddingModel::BGESmallENV15),
            "bge-small-en-v1.5-q" | "bgesmallenv15q" => {
                Ok(fastembed::EmbeddingModel::BGESmallENV15Q)
            }
            "bge-base-en-v1.5" | "bgebaseenv15" => Ok(fastembed::EmbeddingModel::BGEBaseENV15),
            "bge-base-en-v1.5-q" | "bgebaseenv15q" => Ok(fastembed::EmbeddingModel::BGEBaseENV15Q),
            "bge-large-en-v1.5" | "bgelargeenv15" => Ok(fastembed::EmbeddingModel::BGELargeENV15),
            "bge-large-en-v1.5-q" | "bgelargeenv15q" => {
                Ok(fastembed::EmbeddingModel::BGELargeENV15Q)
            }
            _ => Err(EncodingError::InvalidModel(format!(
                "Unknown model: {}. Supported models: all-MiniLM-L6-v2, bge-small-en-v1.5, bge-base-en-v1.5, bge-large-en-v1.5 (add -q suffix for quantized)",
                name
            ))),
        }
    }

    /// Probe the model to determine embedding dimensions.
    fn probe_dimensions(model: &mut TextEmbedding) -> Result<usize, EncodingError> {
        let test_embeddings = model
            .embed(vec!["test"], None)
            .map_err(|e| EncodingError::InitFailed(format!("Failed to probe dimensions: {}", e)))?;

        test_embeddings
            .first()
            .map(|v| v.len())
            .ok_or_else(|| EncodingError::InitFailed("Model returned no embedding".to_string()))
    }
}

impl EmbeddingProvider for EmbeddingModel {
    fn encode(&self, text: &str) -> Result<Vec<f32>, EncodingError> {
        if text.trim().is_empty() {
            return Err(EncodingError::EmptyText);
        }

        let mut model = self.model.lock().map_err(|e| {
            EncodingError::EncodingFailed(format!("Failed to acquire model lock: {}", e))
        })?;

        let embeddings = model
            .embed(vec![text], None)
            .map_err(|e| EncodingError::EncodingFailed(e.to_string()))?;

        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| EncodingError::EncodingFailed("No embedding returned".to_string()))
    }

    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EncodingError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }
        if texts.iter().any(|t| t.trim().is_empty()) {
            // Let the caller fall back to per-text encoding so only the
            // blank entries get skipped.
            return Err(EncodingError::EmptyText);
        }

        let mut model = self.model.lock().map_err(|e| {
            EncodingError::EncodingFailed(format!("Failed to acquire model lock: {}", e))
        })?;

        let embeddings = model
            .embed(texts.to_vec(), None)
            .map_err(|e| EncodingError::EncodingFailed(e.to_string()))?;

        if embeddings.len() != texts.len() {
            return Err(EncodingError::EncodingFailed(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                embeddings.len()
            )));
        }

        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_model_name() {
        let temp_dir = std::env::temp_dir().join("linkwise-embed-invalid");
        let result = EmbeddingModel::new("nonexistent-model", temp_dir);
        assert!(matches!(result, Err(EncodingError::InvalidModel(_))));
    }

    // Integration tests require model download - run with --ignored
    #[test]
    #[ignore = "requires model download"]
    fn test_model_creation() {
        let temp_dir = std::env::temp_dir().join("linkwise-embed-test");
        let model = EmbeddingModel::new("all-MiniLM-L6-v2", temp_dir.clone());
        assert!(model.is_ok());

        let model = model.unwrap();
        assert_eq!(model.name(), "all-MiniLM-L6-v2");
        assert_eq!(model.dimensions(), 384); // MiniLM produces 384-dim embeddings

        let _ = std::fs::remove_dir_all(&temp_dir);
    }

    #[test]
    #[ignore = "requires model download"]
    fn test_encoding_is_deterministic() {
        let temp_dir = std::env::temp_dir().join("linkwise-embed-test-det");
        let model = EmbeddingModel::new("all-MiniLM-L6-v2", temp_dir.clone()).unwrap();

        let first = model.encode("internal links improve navigation").unwrap();
        let second = model.encode("internal links improve navigation").unwrap();
        assert_eq!(first, second);

        let _ = std::fs::remove_dir_all(&temp_dir);
    }

    #[test]
    fn test_mock_provider_determinism() {
        let provider = mock::BagOfWordsProvider;
        let a = provider.encode("rust memory safety").unwrap();
        let b = provider.encode("rust memory safety").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), provider.dimensions());
    }

    #[test]
    fn test_mock_provider_rejects_blank_text() {
        let provider = mock::BagOfWordsProvider;
        assert!(matches!(
            provider.encode("   "),
            Err(EncodingError::EmptyText)
        ));
    }

    #[test]
    fn test_mock_batch_preserves_order_and_length() {
        let provider = mock::BagOfWordsProvider;
        let texts = vec!["alpha beta".to_string(), "gamma delta".to_string()];
        let vectors = provider.encode_batch(&texts).unwrap();

        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[0], provider.encode("alpha beta").unwrap());
        assert_eq!(vectors[1], provider.encode("gamma delta").unwrap());
    }
}
