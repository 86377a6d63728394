//! Request types

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Retrieval request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrieveRequest {
    /// Search query in English or Japanese
    pub query: String,
    /// Number of results to return (default: 3)
    #[serde(default)]
    pub top_k: Option<usize>,
}

impl RetrieveRequest {
    /// Create a new retrieval request
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            top_k: None,
        }
    }

    /// Set the number of results to retrieve
    pub fn with_top_k(mut self, k: usize) -> Self {
        self.top_k = Some(k);
        self
    }

    /// Validate the query and resolve `top_k` against the configured bounds
    pub fn validate(&self, default_top_k: usize, max_top_k: usize) -> Result<usize> {
        validate_query(&self.query)?;
        resolve_top_k(self.top_k, default_top_k, max_top_k)
    }
}

/// Answer generation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// User query in English or Japanese
    pub query: String,
    /// Output language: "en" or "ja". Defaults to the query language
    #[serde(default)]
    pub output_language: Option<String>,
    /// Number of context chunks to retrieve (default: 3)
    #[serde(default)]
    pub top_k: Option<usize>,
}

impl GenerateRequest {
    /// Create a new generation request
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            output_language: None,
            top_k: None,
        }
    }

    /// Force the answer language
    pub fn with_output_language(mut self, language: impl Into<String>) -> Self {
        self.output_language = Some(language.into());
        self
    }

    /// Set the number of context chunks
    pub fn with_top_k(mut self, k: usize) -> Self {
        self.top_k = Some(k);
        self
    }

    /// Validate the query and resolve `top_k` against the configured bounds
    pub fn validate(&self, default_top_k: usize, max_top_k: usize) -> Result<usize> {
        validate_query(&self.query)?;
        resolve_top_k(self.top_k, default_top_k, max_top_k)
    }
}

/// Ingest options passed as query parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestOptions {
    /// Custom chunk size (overrides config)
    pub chunk_size: Option<usize>,
}

fn validate_query(query: &str) -> Result<()> {
    if query.trim().is_empty() {
        return Err(Error::invalid_argument("Query cannot be empty"));
    }
    Ok(())
}

fn resolve_top_k(top_k: Option<usize>, default_top_k: usize, max_top_k: usize) -> Result<usize> {
    let k = top_k.unwrap_or(default_top_k);
    if k == 0 || k > max_top_k {
        return Err(Error::invalid_argument(format!(
            "top_k must be between 1 and {}, got {}",
            max_top_k, k
        )));
    }
    Ok(k)
}
