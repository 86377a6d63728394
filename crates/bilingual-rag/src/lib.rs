//! bilingual-rag: retrieval-augmented question answering over English and Japanese documents
//!
//! This crate turns uploaded plain-text documents into embedded chunks, keeps them in a
//! persistent vector index, retrieves the nearest chunks for a query and assembles them
//! into a bounded context for answer synthesis in the requested language.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use generation::{AnswerOrchestrator, ContextAssembler};
pub use ingestion::{IngestPipeline, TextChunker};
pub use retrieval::{Retriever, VectorIndex};
pub use types::{
    document::{Chunk, DocumentUpload, Language},
    query::{GenerateRequest, RetrieveRequest},
    response::{GenerateResponse, IngestReport, IngestionOutcome, RetrievalResult},
};
