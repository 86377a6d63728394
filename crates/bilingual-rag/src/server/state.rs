//! Application state for the RAG server

use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::Result;
use crate::generation::AnswerOrchestrator;
use crate::ingestion::IngestPipeline;
use crate::providers::{EmbeddingProvider, Providers};
use crate::retrieval::{Retriever, VectorIndex};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: RagConfig,
    /// The one shared vector index
    index: Arc<VectorIndex>,
    /// Embedding provider (hashing or Ollama)
    embedder: Arc<dyn EmbeddingProvider>,
    /// Ingestion pipeline
    pipeline: IngestPipeline,
    /// Retrieval pipeline
    retriever: Retriever,
    /// Answer orchestrator
    orchestrator: AnswerOrchestrator,
}

impl AppState {
    /// Build providers and pipelines, then load the persisted index
    pub async fn new(config: RagConfig) -> Result<Self> {
        config.validate()?;
        tracing::info!("Initializing RAG application state...");

        let providers = Providers::from_config(&config)?;
        let index = Arc::new(VectorIndex::open(&config.index));

        let loader = Arc::clone(&index);
        let loaded = tokio::task::spawn_blocking(move || loader.load())
            .await
            .map_err(crate::error::Error::join)?;
        tracing::info!(
            "Vector index ready: {} chunks from {}",
            loaded,
            index.snapshot_path().display()
        );

        Ok(Self::from_parts(config, index, providers))
    }

    /// Assemble state around an already constructed index
    pub fn from_parts(config: RagConfig, index: Arc<VectorIndex>, providers: Providers) -> Self {
        let pipeline = IngestPipeline::new(
            Arc::clone(&index),
            Arc::clone(&providers.embedder),
            Arc::clone(&providers.detector),
        )
        .with_config(&config.chunking);

        let retriever = Retriever::new(Arc::clone(&index), Arc::clone(&providers.embedder));

        let orchestrator = AnswerOrchestrator::new(
            retriever.clone(),
            Arc::clone(&providers.detector),
            Arc::clone(&providers.translator),
        )
        .with_config(&config.generation);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                index,
                embedder: providers.embedder,
                pipeline,
                retriever,
                orchestrator,
            }),
        }
    }

    /// Get configuration
    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    /// Get the vector index
    pub fn index(&self) -> &Arc<VectorIndex> {
        &self.inner.index
    }

    /// Get the embedding provider
    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.inner.embedder
    }

    /// Get the ingestion pipeline
    pub fn pipeline(&self) -> &IngestPipeline {
        &self.inner.pipeline
    }

    /// Get the retriever
    pub fn retriever(&self) -> &Retriever {
        &self.inner.retriever
    }

    /// Get the answer orchestrator
    pub fn orchestrator(&self) -> &AnswerOrchestrator {
        &self.inner.orchestrator
    }
}
