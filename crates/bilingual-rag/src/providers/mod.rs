//! Provider abstractions for embeddings, language detection and translation
//!
//! This module provides trait-based abstractions that allow switching between
//! the offline hashing backend and a local Ollama server.

pub mod embedding;
pub mod hashing;
pub mod language;
pub mod ollama;
pub mod translation;

use std::sync::Arc;

use crate::config::{EmbeddingBackend, RagConfig};
use crate::error::Result;

pub use embedding::EmbeddingProvider;
pub use hashing::HashingEmbedder;
pub use language::{Detection, LanguageDetector, ScriptDetector};
pub use ollama::{OllamaClient, OllamaEmbedder};
pub use translation::{OllamaTranslator, PassthroughTranslator, Translation, Translator};

/// Providers selected by configuration
pub struct Providers {
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub detector: Arc<dyn LanguageDetector>,
    pub translator: Arc<dyn Translator>,
}

impl Providers {
    /// Build the configured providers, sharing one Ollama client between them
    pub fn from_config(config: &RagConfig) -> Result<Self> {
        let needs_ollama =
            config.embeddings.backend == EmbeddingBackend::Ollama || config.translation.enabled;
        let client = if needs_ollama {
            Some(Arc::new(OllamaClient::new(&config.ollama)?))
        } else {
            None
        };

        let embedder: Arc<dyn EmbeddingProvider> = match (&config.embeddings.backend, &client) {
            (EmbeddingBackend::Ollama, Some(client)) => Arc::new(OllamaEmbedder::new(
                Arc::clone(client),
                config.embeddings.model.clone(),
                config.embeddings.dimensions,
            )),
            _ => Arc::new(HashingEmbedder::new(config.embeddings.dimensions)?),
        };

        let translator: Arc<dyn Translator> = match (&client, config.translation.enabled) {
            (Some(client), true) => Arc::new(OllamaTranslator::new(
                Arc::clone(client),
                config.translation.model.clone(),
                config.translation.temperature,
            )),
            _ => Arc::new(PassthroughTranslator),
        };

        tracing::info!(
            "Providers: embedder={}, translator={}",
            embedder.name(),
            translator.name()
        );

        Ok(Self {
            embedder,
            detector: Arc::new(ScriptDetector::new()),
            translator,
        })
    }
}
