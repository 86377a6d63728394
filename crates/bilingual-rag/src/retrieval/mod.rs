//! Vector index and retrieval

pub mod index;
mod search;

pub use index::VectorIndex;
pub use search::Retriever;
