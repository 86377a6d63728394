//! Document ingestion: detect, chunk, embed, insert, persist

use std::sync::Arc;
use std::time::Duration;

use crate::config::ChunkingConfig;
use crate::error::{Error, Result};
use crate::providers::{Detection, EmbeddingProvider, LanguageDetector};
use crate::retrieval::VectorIndex;
use crate::types::{Chunk, DocumentUpload, IngestReport, IngestionOutcome, Language};

use super::chunker::TextChunker;

/// Default chunk size in characters
pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// Overlap between consecutive chunks in characters
pub const DEFAULT_CHUNK_OVERLAP: usize = 50;

/// Chunks and vectors of one document, ready for insertion
struct PreparedDocument {
    language: Language,
    pieces: Vec<String>,
    vectors: Vec<Vec<f32>>,
}

/// Ingestion pipeline
///
/// Each document is ingested atomically: its chunks are inserted as one batch
/// only after detection, chunking and embedding have all succeeded.
#[derive(Clone)]
pub struct IngestPipeline {
    index: Arc<VectorIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
    detector: Arc<dyn LanguageDetector>,
    default_chunk_size: usize,
    overlap: usize,
    timeout: Option<Duration>,
}

impl IngestPipeline {
    /// Create a pipeline with the default chunking parameters
    pub fn new(
        index: Arc<VectorIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
        detector: Arc<dyn LanguageDetector>,
    ) -> Self {
        Self {
            index,
            embedder,
            detector,
            default_chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_CHUNK_OVERLAP,
            timeout: None,
        }
    }

    /// Apply chunk size, overlap and timeout from config
    pub fn with_config(mut self, config: &ChunkingConfig) -> Self {
        self.default_chunk_size = config.chunk_size;
        self.overlap = config.chunk_overlap;
        self.timeout = config.ingest_timeout_secs.map(Duration::from_secs);
        self
    }

    /// Set the chunk overlap
    pub fn with_overlap(mut self, overlap: usize) -> Self {
        self.overlap = overlap;
        self
    }

    /// Bound detection, chunking and embedding of a single document
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn default_chunk_size(&self) -> usize {
        self.default_chunk_size
    }

    pub fn index(&self) -> &Arc<VectorIndex> {
        &self.index
    }

    /// Ingest one decoded document
    pub async fn ingest(
        &self,
        document: &DocumentUpload,
        chunk_size: usize,
    ) -> Result<IngestionOutcome> {
        if document.raw_text.trim().is_empty() {
            return Err(Error::UnsupportedFormat("Empty file".to_string()));
        }
        let chunker = TextChunker::new(chunk_size, self.overlap)?;

        let prepared = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.prepare(document, chunker))
                .await
                .map_err(|_| {
                    Error::Timeout(format!(
                        "Ingestion of {} exceeded {:?}",
                        document.filename, limit
                    ))
                })??,
            None => self.prepare(document, chunker).await?,
        };

        let chunks: Vec<Chunk> = prepared
            .pieces
            .into_iter()
            .zip(prepared.vectors)
            .map(|(text, vector)| {
                Chunk::new(text, prepared.language, document.filename.clone(), vector)
            })
            .collect();
        let chunk_count = chunks.len();

        // Past this point the document is committed; no timeout applies.
        let index = Arc::clone(&self.index);
        let persisted = tokio::task::spawn_blocking(move || index.insert_and_persist(chunks))
            .await
            .map_err(Error::join)??;

        tracing::info!(
            "Ingested {} as '{}': {} chunks (index size {})",
            document.filename,
            prepared.language,
            chunk_count,
            self.index.size()
        );

        Ok(IngestionOutcome {
            filename: document.filename.clone(),
            language: prepared.language,
            chunk_count,
            char_count: document.raw_text.chars().count(),
            persisted,
        })
    }

    async fn prepare(
        &self,
        document: &DocumentUpload,
        chunker: TextChunker,
    ) -> Result<PreparedDocument> {
        let detector = Arc::clone(&self.detector);
        let text = document.raw_text.clone();
        let (detection, mut pieces) = tokio::task::spawn_blocking(move || {
            let detection = detector.detect(&text);
            (detection, chunker.chunk(&text))
        })
        .await
        .map_err(Error::join)?;

        // Whitespace runs longer than a chunk yield blank pieces with nothing to embed
        let total = pieces.len();
        pieces.retain(|piece| !piece.trim().is_empty());
        if pieces.len() < total {
            tracing::debug!(
                "Skipped {} blank chunks of {}",
                total - pieces.len(),
                document.filename
            );
        }

        if let Detection::Fallback { language, reason } = &detection {
            tracing::debug!(
                "Language detection fell back to '{}' for {}: {}",
                language,
                document.filename,
                reason
            );
        }

        if pieces.is_empty() {
            return Err(Error::UnsupportedFormat("Empty file".to_string()));
        }

        let vectors = self.embedder.embed_batch(&pieces).await?;
        if vectors.len() != pieces.len() {
            return Err(Error::embedding(format!(
                "{} returned {} vectors for {} chunks",
                self.embedder.name(),
                vectors.len(),
                pieces.len()
            )));
        }

        Ok(PreparedDocument {
            language: detection.language(),
            pieces,
            vectors,
        })
    }

    /// Ingest a batch of uploaded files
    ///
    /// Per-file failures are collected into the report as `"<filename>: <reason>"`
    /// and do not stop the rest of the batch. Only an empty batch or invalid
    /// chunk parameters fail the whole call.
    pub async fn ingest_files(
        &self,
        files: Vec<(String, Vec<u8>)>,
        chunk_size: Option<usize>,
    ) -> Result<IngestReport> {
        if files.is_empty() {
            return Err(Error::invalid_argument("No files provided"));
        }
        let chunk_size = chunk_size.unwrap_or(self.default_chunk_size);
        TextChunker::new(chunk_size, self.overlap)?;

        let mut documents = Vec::new();
        let mut errors = Vec::new();

        for (filename, bytes) in files {
            if !filename.ends_with(".txt") {
                errors.push(format!("{}: Only .txt files are supported", filename));
                continue;
            }

            let raw_text = match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(_) => {
                    errors.push(format!(
                        "{}: Unable to decode file. Please ensure it's UTF-8 encoded.",
                        filename
                    ));
                    continue;
                }
            };

            let upload = DocumentUpload::new(filename, raw_text);
            match self.ingest(&upload, chunk_size).await {
                Ok(outcome) => documents.push(outcome),
                Err(Error::UnsupportedFormat(reason)) => {
                    errors.push(format!("{}: {}", upload.filename, reason));
                }
                Err(e) => {
                    tracing::error!("Error processing {}: {}", upload.filename, e);
                    errors.push(format!("{}: Error processing file - {}", upload.filename, e));
                }
            }
        }

        Ok(IngestReport::new(documents, errors, self.index.size()))
    }
}
