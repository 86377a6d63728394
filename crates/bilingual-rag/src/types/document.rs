//! Language tags, indexed chunks and uploaded documents

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Supported document and answer languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English
    En,
    /// Japanese
    Ja,
}

impl Language {
    /// Every language the system accepts
    pub const SUPPORTED: [Language; 2] = [Language::En, Language::Ja];

    /// ISO 639-1 tag
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ja => "ja",
        }
    }

    /// Parse a tag such as `"en"` or `" JA "`
    pub fn parse(tag: &str) -> Result<Self> {
        match tag.trim().to_lowercase().as_str() {
            "en" => Ok(Self::En),
            "ja" => Ok(Self::Ja),
            other => Err(Error::UnsupportedLanguage(other.to_string())),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A unit of indexed text with its embedding
///
/// `id` is the chunk's insertion position in the index. It is assigned by
/// [`VectorIndex::insert`](crate::retrieval::VectorIndex::insert) and is meant
/// for display, not as a lookup key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Insertion-order identifier
    pub id: u64,
    /// Chunk text (non-empty)
    pub text: String,
    /// Language inherited from the source document
    pub language: Language,
    /// Source filename
    pub filename: String,
    /// Length of `text` in characters
    pub length: usize,
    /// Embedding vector, never mutated after insertion
    pub vector: Vec<f32>,
}

impl Chunk {
    /// Create a chunk that has not been inserted yet
    pub fn new(
        text: impl Into<String>,
        language: Language,
        filename: impl Into<String>,
        vector: Vec<f32>,
    ) -> Self {
        let text = text.into();
        Self {
            id: 0,
            length: text.chars().count(),
            text,
            language,
            filename: filename.into(),
            vector,
        }
    }
}

/// An uploaded document ready for ingestion
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    /// Original filename
    pub filename: String,
    /// Decoded UTF-8 text
    pub raw_text: String,
}

impl DocumentUpload {
    /// Create a new upload
    pub fn new(filename: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            raw_text: raw_text.into(),
        }
    }
}
