//! Embedding provider trait for generating text embeddings

use async_trait::async_trait;
use crate::error::{Error, Result};

/// Trait for generating text embeddings
///
/// Implementations must be deterministic for a fixed model: the same text
/// maps to the same vector.
///
/// Implementations:
/// - `HashingEmbedder`: offline feature hashing
/// - `OllamaEmbedder`: local Ollama server (multilingual models)
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts, preserving input order
    ///
    /// Default implementation calls `embed` sequentially.
    /// Implementations should override for better performance.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Fail with `DimensionMismatch` on the first vector of the wrong length
    fn check_dimensions(&self, vectors: &[Vec<f32>]) -> Result<()> {
        let expected = self.dimensions();
        match vectors.iter().find(|v| v.len() != expected) {
            Some(bad) => Err(Error::DimensionMismatch {
                expected,
                actual: bad.len(),
            }),
            None => Ok(()),
        }
    }

    /// Check if the provider is healthy and available
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
