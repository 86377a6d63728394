//! Response types for ingestion, retrieval and generation

use serde::{Deserialize, Serialize};

use super::document::{Chunk, Language};

/// One ranked hit from the vector index
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalResult {
    /// The matched chunk
    pub chunk: Chunk,
    /// `1 / (1 + distance)`, in `[0, 1]`, higher is more similar
    pub similarity_score: f32,
}

/// Round a similarity score to 4 decimal places for display
pub fn round_score(score: f32) -> f64 {
    (f64::from(score) * 10_000.0).round() / 10_000.0
}

/// Retrieved chunk as exposed to API callers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub id: u64,
    pub text: String,
    pub language: Language,
    pub filename: String,
    pub similarity_score: f64,
}

impl From<&RetrievalResult> for RetrievedDocument {
    fn from(result: &RetrievalResult) -> Self {
        Self {
            id: result.chunk.id,
            text: result.chunk.text.clone(),
            language: result.chunk.language,
            filename: result.chunk.filename.clone(),
            similarity_score: round_score(result.similarity_score),
        }
    }
}

/// Response from the retrieval endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrieveResponse {
    pub query: String,
    pub results: Vec<RetrievedDocument>,
    pub total_results: usize,
}

impl RetrieveResponse {
    /// Build a response from ranked results
    pub fn new(query: impl Into<String>, results: &[RetrievalResult]) -> Self {
        let results: Vec<RetrievedDocument> = results.iter().map(RetrievedDocument::from).collect();
        Self {
            query: query.into(),
            total_results: results.len(),
            results,
        }
    }
}

/// Per-file ingestion summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionOutcome {
    pub filename: String,
    pub language: Language,
    /// Number of chunks inserted
    #[serde(rename = "chunks")]
    pub chunk_count: usize,
    /// Length of the decoded text in characters
    #[serde(rename = "size")]
    pub char_count: usize,
    /// Whether the snapshot write after insertion succeeded
    pub persisted: bool,
}

/// Batch ingestion report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReport {
    pub status: String,
    pub ingested: usize,
    pub documents: Vec<IngestionOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    pub total_documents_in_index: usize,
}

impl IngestReport {
    /// Assemble a report from per-file results
    pub fn new(documents: Vec<IngestionOutcome>, errors: Vec<String>, total: usize) -> Self {
        Self {
            status: "success".to_string(),
            ingested: documents.len(),
            documents,
            errors: if errors.is_empty() { None } else { Some(errors) },
            total_documents_in_index: total,
        }
    }
}

/// Context chunk summary inside a generated answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextDocument {
    pub id: u64,
    /// Leading characters of the chunk, suffixed with "..." when cut
    pub text: String,
    pub language: Language,
    pub filename: String,
    pub similarity_score: f64,
}

impl ContextDocument {
    /// Summarize a retrieval result, cutting the text to `snippet_chars`
    pub fn from_result(result: &RetrievalResult, snippet_chars: usize) -> Self {
        let text = &result.chunk.text;
        let text = if text.chars().count() > snippet_chars {
            let mut snippet: String = text.chars().take(snippet_chars).collect();
            snippet.push_str("...");
            snippet
        } else {
            text.clone()
        };

        Self {
            id: result.chunk.id,
            text,
            language: result.chunk.language,
            filename: result.chunk.filename.clone(),
            similarity_score: round_score(result.similarity_score),
        }
    }
}

/// Diagnostics attached to a generated answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugInfo {
    pub refined_query: String,
    pub num_context_chunks: usize,
    pub query_language: Language,
    pub output_language: Language,
}

/// Final payload of the answer orchestrator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub query: String,
    pub refined_query: String,
    /// Synthesized answer text
    pub response: String,
    /// Resolved output language
    pub language: Language,
    /// Bounded context handed to synthesis
    pub context: String,
    pub retrieved_context: Vec<ContextDocument>,
    pub num_context_docs: usize,
    pub debug_info: DebugInfo,
}

/// Vector index statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    pub total_documents: usize,
    /// Established dimensionality, `None` until the first insertion
    pub dimension: Option<usize>,
    pub index_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(text: &str, score: f32) -> RetrievalResult {
        RetrievalResult {
            chunk: Chunk::new(text, Language::En, "notes.txt", vec![1.0]),
            similarity_score: score,
        }
    }

    #[test]
    fn test_round_score() {
        assert_eq!(round_score(0.123_456), 0.1235);
        assert_eq!(round_score(1.0), 1.0);
    }

    #[test]
    fn test_context_document_snippet() {
        let long = "a".repeat(250);
        let doc = ContextDocument::from_result(&result(&long, 0.5), 200);
        assert_eq!(doc.text.chars().count(), 203);
        assert!(doc.text.ends_with("..."));

        let short = ContextDocument::from_result(&result("short", 0.5), 200);
        assert_eq!(short.text, "short");
    }

    #[test]
    fn test_ingest_report_errors_omitted_when_empty() {
        let report = IngestReport::new(Vec::new(), Vec::new(), 0);
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("errors").is_none());
        assert_eq!(json["status"], "success");
    }

    #[test]
    fn test_outcome_field_names() {
        let outcome = IngestionOutcome {
            filename: "a.txt".into(),
            language: Language::Ja,
            chunk_count: 2,
            char_count: 30,
            persisted: true,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["chunks"], 2);
        assert_eq!(json["size"], 30);
        assert_eq!(json["language"], "ja");
    }
}
