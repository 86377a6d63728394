//! Configuration for the RAG system

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main RAG system configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Embedding configuration
    pub embeddings: EmbeddingConfig,
    /// Ollama connection shared by the embedding and translation backends
    pub ollama: OllamaConfig,
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// Vector index configuration
    pub index: IndexConfig,
    /// Answer generation configuration
    pub generation: GenerationConfig,
    /// Translation configuration
    pub translation: TranslationConfig,
}

impl RagConfig {
    /// Load configuration from an optional TOML file, then apply `RAG_*` environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| {
                    Error::Config(format!("Failed to read {}: {}", path.display(), e))
                })?;
                Self::from_toml(&content)?
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }

    /// Apply overrides from a key lookup (the process environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("RAG_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("RAG_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| Error::Config(format!("RAG_PORT is not a valid port: {}", port)))?;
        }
        if let Some(dir) = lookup("RAG_INDEX_DIR") {
            self.index.storage_dir = PathBuf::from(dir);
        }
        if let Some(backend) = lookup("RAG_EMBEDDING_BACKEND") {
            self.embeddings.backend = match backend.to_lowercase().as_str() {
                "hashing" => EmbeddingBackend::Hashing,
                "ollama" => EmbeddingBackend::Ollama,
                other => {
                    return Err(Error::Config(format!("Unknown embedding backend: {}", other)))
                }
            };
        }
        if let Some(url) = lookup("RAG_OLLAMA_URL") {
            self.ollama.base_url = url;
        }
        if let Some(enabled) = lookup("RAG_TRANSLATION_ENABLED") {
            self.translation.enabled = matches!(enabled.to_lowercase().as_str(), "1" | "true" | "yes");
        }
        Ok(())
    }

    /// Reject settings the pipelines cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.embeddings.dimensions == 0 {
            return Err(Error::Config("embeddings.dimensions must be > 0".to_string()));
        }
        if self.chunking.chunk_size == 0
            || self.chunking.chunk_overlap == 0
            || self.chunking.chunk_overlap >= self.chunking.chunk_size
        {
            return Err(Error::Config(format!(
                "chunking.chunk_overlap ({}) must be positive and smaller than chunking.chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.generation.default_top_k == 0
            || self.generation.default_top_k > self.generation.max_top_k
        {
            return Err(Error::Config(format!(
                "generation.default_top_k must be within 1..={}",
                self.generation.max_top_k
            )));
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum upload size in bytes (default: 20MB)
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            enable_cors: true,
            max_upload_size: 20 * 1024 * 1024,
        }
    }
}

/// Which embedding backend to run
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// Offline feature-hashing embedder
    #[default]
    Hashing,
    /// Ollama `/api/embed`
    Ollama,
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Backend selection
    pub backend: EmbeddingBackend,
    /// Ollama model name (ignored by the hashing backend)
    pub model: String,
    /// Embedding dimensions (384 for the hashing backend and MiniLM models,
    /// 768 for paraphrase-multilingual)
    pub dimensions: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::Hashing,
            model: "paraphrase-multilingual".to_string(),
            dimensions: 384,
        }
    }
}

/// Ollama connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    /// Ollama base URL
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    pub max_retries: u32,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            timeout_secs: 120,
            max_retries: 2,
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Default chunk size in characters (overridable per upload)
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,
    /// Upper bound on detection + chunking + embedding for one document.
    /// Never applied to the index insert and persist that follow.
    pub ingest_timeout_secs: Option<u64>,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
            ingest_timeout_secs: None,
        }
    }
}

/// Vector index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Directory holding the index snapshot
    pub storage_dir: PathBuf,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from("data").join("vector_index"),
        }
    }
}

/// Answer generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Results retrieved when a request omits `top_k`
    pub default_top_k: usize,
    /// Largest accepted `top_k`
    pub max_top_k: usize,
    /// Cap on the assembled context, in characters
    pub max_context_chars: usize,
    /// Leading characters of the bounded context quoted in the answer template
    pub summary_chars: usize,
    /// Snippet length for `retrieved_context` entries
    pub snippet_chars: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            default_top_k: 3,
            max_top_k: 10,
            max_context_chars: 2000,
            summary_chars: 1000,
            snippet_chars: 200,
        }
    }
}

/// Translation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// Route cross-language answers through Ollama; pass-through otherwise
    pub enabled: bool,
    /// Ollama generation model used for translation
    pub model: String,
    /// Sampling temperature for translation prompts
    pub temperature: f32,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            model: "llama3.2:3b".to_string(),
            temperature: 0.1,
        }
    }
}
