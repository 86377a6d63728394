//! Document ingestion: chunking and the ingest pipeline

pub mod chunker;
mod pipeline;

pub use chunker::TextChunker;
pub use pipeline::{IngestPipeline, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
