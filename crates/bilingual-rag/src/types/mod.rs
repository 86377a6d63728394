//! Core types for the RAG system

pub mod document;
pub mod query;
pub mod response;

pub use document::{Chunk, DocumentUpload, Language};
pub use query::{GenerateRequest, IngestOptions, RetrieveRequest};
pub use response::{
    ContextDocument, DebugInfo, GenerateResponse, IndexStats, IngestReport, IngestionOutcome,
    RetrievalResult, RetrieveResponse, RetrievedDocument,
};
