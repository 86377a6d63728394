//! Offline feature-hashing embedder
//!
//! Each Unicode word of the lower-cased text is hashed into one of `dimensions`
//! buckets and the bucket counts are L2-normalized. Japanese text segments
//! into single ideographs and kana runs, which keeps the scheme usable for
//! both supported languages without a model download.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use unicode_segmentation::UnicodeSegmentation;

use crate::error::{Error, Result};

use super::embedding::EmbeddingProvider;

/// Deterministic bag-of-words embedder
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    /// Create a new hashing embedder
    pub fn new(dimensions: usize) -> Result<Self> {
        if dimensions == 0 {
            return Err(Error::Config("embedding dimensions must be > 0".to_string()));
        }
        Ok(Self { dimensions })
    }

    /// Embed synchronously
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0f32; self.dimensions];

        for token in text.to_lowercase().unicode_words() {
            let digest = Sha256::digest(token.as_bytes());
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(&digest[..8]);
            let bucket = (u64::from_le_bytes(bytes) % self.dimensions as u64) as usize;
            vector[bucket] += 1.0;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embedder = self.clone();
        let text = text.to_string();
        tokio::task::spawn_blocking(move || embedder.embed_text(&text))
            .await
            .map_err(Error::join)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let embedder = self.clone();
        let texts = texts.to_vec();
        tokio::task::spawn_blocking(move || {
            texts.iter().map(|text| embedder.embed_text(text)).collect()
        })
        .await
        .map_err(Error::join)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "hashing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn test_deterministic_and_normalized() {
        let embedder = HashingEmbedder::new(384).unwrap();
        let a = embedder.embed_text("Reduce sodium intake");
        let b = embedder.embed_text("Reduce sodium intake");
        assert_eq!(a, b);
        assert_eq!(a.len(), 384);
        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_case_insensitive() {
        let embedder = HashingEmbedder::new(64).unwrap();
        assert_eq!(embedder.embed_text("Sodium"), embedder.embed_text("sodium"));
    }

    #[test]
    fn test_shared_words_are_closer() {
        let embedder = HashingEmbedder::new(384).unwrap();
        let query = embedder.embed_text("sodium intake");
        let related = embedder.embed_text("patients should reduce sodium intake");
        let unrelated = embedder.embed_text("regular exercise is recommended");
        assert!(cosine(&query, &related) > cosine(&query, &unrelated));
    }

    #[test]
    fn test_japanese_tokens() {
        let embedder = HashingEmbedder::new(384).unwrap();
        let vector = embedder.embed_text("塩分を控える");
        assert!(vector.iter().any(|x| *x > 0.0));
    }

    #[test]
    fn test_no_words_gives_zero_vector() {
        let embedder = HashingEmbedder::new(16).unwrap();
        assert!(embedder.embed_text("!!! ...").iter().all(|x| *x == 0.0));
    }

    #[tokio::test]
    async fn test_batch_preserves_order() {
        let embedder = HashingEmbedder::new(128).unwrap();
        let texts = vec!["first text".to_string(), "second text".to_string()];
        let batch = embedder.embed_batch(&texts).await.unwrap();
        assert_eq!(batch[0], embedder.embed_text("first text"));
        assert_eq!(batch[1], embedder.embed_text("second text"));
    }

    #[tokio::test]
    async fn test_async_embed_matches_sync() {
        let embedder = HashingEmbedder::new(384).unwrap();
        let query = "how much sodium intake is advised for hypertension ".repeat(2000);
        let vector = embedder.embed(&query).await.unwrap();
        assert_eq!(vector, embedder.embed_text(&query));
        assert_eq!(vector.len(), embedder.dimensions());
    }
}
