//! Query embedding plus nearest-neighbour lookup

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;
use crate::types::RetrievalResult;

use super::index::VectorIndex;

/// Retrieval pipeline over a shared index
#[derive(Clone)]
pub struct Retriever {
    index: Arc<VectorIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl Retriever {
    pub fn new(index: Arc<VectorIndex>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { index, embedder }
    }

    pub fn index(&self) -> &Arc<VectorIndex> {
        &self.index
    }

    /// Embed `query` and return its `k` nearest chunks
    ///
    /// An empty index gives an empty result; deciding whether that is a
    /// "not found" condition is left to the caller.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<RetrievalResult>> {
        if query.trim().is_empty() {
            return Err(Error::invalid_argument("Query cannot be empty"));
        }
        if k == 0 {
            return Err(Error::invalid_argument("k must be >= 1"));
        }
        if self.index.is_empty() {
            tracing::debug!("Index is empty, skipping query embedding");
            return Ok(Vec::new());
        }

        let vector = self.embedder.embed(query).await?;

        let index = Arc::clone(&self.index);
        let results = tokio::task::spawn_blocking(move || index.search(&vector, k))
            .await
            .map_err(Error::join)??;

        tracing::debug!(
            "Retrieved {} results for query ({} chars)",
            results.len(),
            query.chars().count()
        );
        Ok(results)
    }
}
