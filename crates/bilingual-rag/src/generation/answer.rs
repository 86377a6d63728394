//! Answer orchestration over one query
//!
//! resolve languages -> refine -> retrieve -> assemble and bound context ->
//! synthesize -> translate when the answer language differs from the query.

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::GenerationConfig;
use crate::error::{Error, Result};
use crate::providers::{Detection, LanguageDetector, Translation, Translator};
use crate::retrieval::Retriever;
use crate::types::{ContextDocument, DebugInfo, GenerateResponse, Language};

use super::context::ContextAssembler;

const ENGLISH_DIRECTIVES: [&str; 4] = [
    "answer in english",
    "respond in english",
    "reply in english",
    "英語で",
];

const JAPANESE_DIRECTIVES: [&str; 4] = [
    "answer in japanese",
    "respond in japanese",
    "reply in japanese",
    "日本語で",
];

/// Produces answer text from bounded context
#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn synthesize(
        &self,
        query: &str,
        context: &str,
        query_language: Language,
        output_language: Language,
    ) -> Result<String>;

    fn name(&self) -> &str;
}

/// Fixed-wording answer that quotes the leading part of the context
#[derive(Debug, Clone, Copy)]
pub struct TemplateSynthesizer {
    summary_chars: usize,
}

impl Default for TemplateSynthesizer {
    fn default() -> Self {
        Self {
            summary_chars: 1000,
        }
    }
}

impl TemplateSynthesizer {
    pub fn new(summary_chars: usize) -> Self {
        Self { summary_chars }
    }

    pub fn render(&self, context: &str, output_language: Language) -> String {
        let summary: String = context.chars().take(self.summary_chars).collect();

        match output_language {
            Language::En => format!(
                "Based on the retrieved medical guidelines and research documents, \
                 here is the answer to your question:\n\n{}\n\n\
                 Please note that this information is based on the available documents. \
                 For personalized medical advice, please consult with a healthcare professional.",
                summary
            ),
            Language::Ja => format!(
                "取得した医療ガイドラインと研究資料に基づいて、以下のように説明できます：\n\n{}\n\n\
                 この情報は利用可能な資料に基づいています。\
                 個別の医療アドバイスについては、医療専門家に相談してください。",
                summary
            ),
        }
    }
}

#[async_trait]
impl Synthesizer for TemplateSynthesizer {
    async fn synthesize(
        &self,
        _query: &str,
        context: &str,
        _query_language: Language,
        output_language: Language,
    ) -> Result<String> {
        Ok(self.render(context, output_language))
    }

    fn name(&self) -> &str {
        "template"
    }
}

/// Language named by an "answer in ..." phrase inside the query
///
/// English directives are checked first. Matching ignores case.
pub fn directive_language(query: &str) -> Option<Language> {
    let lowered = query.to_lowercase();
    if ENGLISH_DIRECTIVES.iter().any(|phrase| lowered.contains(phrase)) {
        Some(Language::En)
    } else if JAPANESE_DIRECTIVES.iter().any(|phrase| lowered.contains(phrase)) {
        Some(Language::Ja)
    } else {
        None
    }
}

/// Resolve the answer language
///
/// An explicit non-blank override wins and must name a supported language.
/// Otherwise a directive phrase in the query decides, then the query language.
pub fn resolve_output_language(
    requested: Option<&str>,
    query: &str,
    query_language: Language,
) -> Result<Language> {
    match requested.map(str::trim).filter(|tag| !tag.is_empty()) {
        Some(tag) => Language::parse(tag),
        None => Ok(directive_language(query).unwrap_or(query_language)),
    }
}

/// Normalize a query before retrieval
pub fn refine_query(query: &str) -> String {
    query.trim().to_string()
}

/// Runs the full question-answering flow
#[derive(Clone)]
pub struct AnswerOrchestrator {
    retriever: Retriever,
    detector: Arc<dyn LanguageDetector>,
    translator: Arc<dyn Translator>,
    synthesizer: Arc<dyn Synthesizer>,
    assembler: ContextAssembler,
    snippet_chars: usize,
}

impl AnswerOrchestrator {
    pub fn new(
        retriever: Retriever,
        detector: Arc<dyn LanguageDetector>,
        translator: Arc<dyn Translator>,
    ) -> Self {
        Self {
            retriever,
            detector,
            translator,
            synthesizer: Arc::new(TemplateSynthesizer::default()),
            assembler: ContextAssembler::default(),
            snippet_chars: 200,
        }
    }

    /// Apply context cap, template summary length and snippet length
    pub fn with_config(mut self, config: &GenerationConfig) -> Self {
        self.assembler = ContextAssembler::new(config.max_context_chars);
        self.synthesizer = Arc::new(TemplateSynthesizer::new(config.summary_chars));
        self.snippet_chars = config.snippet_chars;
        self
    }

    /// Replace the synthesis step
    pub fn with_synthesizer(mut self, synthesizer: Arc<dyn Synthesizer>) -> Self {
        self.synthesizer = synthesizer;
        self
    }

    /// Answer `query` from the `k` nearest chunks
    pub async fn generate(
        &self,
        query: &str,
        output_language: Option<&str>,
        k: usize,
    ) -> Result<GenerateResponse> {
        if query.trim().is_empty() {
            return Err(Error::invalid_argument("Query cannot be empty"));
        }

        let query_language = match self.detector.detect(query) {
            Detection::Detected(language) => language,
            Detection::Fallback { language, reason } => {
                tracing::debug!("Query language fell back to '{}': {}", language, reason);
                language
            }
        };
        let output_language = resolve_output_language(output_language, query, query_language)?;

        let refined_query = refine_query(query);
        let results = self.retriever.retrieve(&refined_query, k).await?;
        if results.is_empty() {
            return Err(Error::NoRelevantDocuments);
        }

        let context = self.assembler.build(&results);
        let mut response = self
            .synthesizer
            .synthesize(query, &context, query_language, output_language)
            .await?;

        if output_language != query_language {
            response = match self
                .translator
                .translate(&response, output_language, Some(query_language))
                .await
            {
                Translation::Translated(text) => text,
                Translation::Fallback { text, reason } => {
                    tracing::warn!(
                        "Translation to '{}' via {} failed: {}. Returning original response.",
                        output_language,
                        self.translator.name(),
                        reason
                    );
                    text
                }
            };
        }

        tracing::info!(
            "Generated answer: query_language={}, output_language={}, context_docs={}",
            query_language,
            output_language,
            results.len()
        );

        let retrieved_context: Vec<ContextDocument> = results
            .iter()
            .map(|result| ContextDocument::from_result(result, self.snippet_chars))
            .collect();

        Ok(GenerateResponse {
            query: query.to_string(),
            refined_query: refined_query.clone(),
            response,
            language: output_language,
            context,
            num_context_docs: retrieved_context.len(),
            retrieved_context,
            debug_info: DebugInfo {
                refined_query,
                num_context_chunks: results.len(),
                query_language,
                output_language,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{HashingEmbedder, PassthroughTranslator, ScriptDetector};
    use crate::retrieval::VectorIndex;
    use crate::types::Chunk;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Tags translated text with the target language
    #[derive(Default)]
    struct TaggingTranslator {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Translator for TaggingTranslator {
        async fn translate(
            &self,
            text: &str,
            target: Language,
            _source: Option<Language>,
        ) -> Translation {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Translation::Translated(format!("[{}] {}", target, text))
        }

        fn name(&self) -> &str {
            "tagging"
        }
    }

    fn orchestrator(dir: &TempDir, translator: Arc<dyn Translator>) -> AnswerOrchestrator {
        let embedder = Arc::new(HashingEmbedder::new(128).unwrap());
        let index = Arc::new(VectorIndex::new(dir.path()));
        let docs = [
            ("Patients with hypertension should reduce sodium intake.", Language::En, "bp.txt"),
            ("高血圧の患者は塩分の摂取を控えるべきです。", Language::Ja, "bp_ja.txt"),
        ];
        index
            .insert(
                docs.iter()
                    .map(|(text, lang, file)| Chunk::new(*text, *lang, *file, embedder.embed_text(text)))
                    .collect(),
            )
            .unwrap();

        AnswerOrchestrator::new(
            Retriever::new(index, embedder),
            Arc::new(ScriptDetector::new()),
            translator,
        )
    }

    #[test]
    fn test_directive_language() {
        assert_eq!(directive_language("Please ANSWER IN ENGLISH"), Some(Language::En));
        assert_eq!(directive_language("塩分について英語で教えて"), Some(Language::En));
        assert_eq!(directive_language("sodium? reply in Japanese"), Some(Language::Ja));
        assert_eq!(directive_language("日本語でお願いします"), Some(Language::Ja));
        assert_eq!(directive_language("what about sodium?"), None);
        assert_eq!(
            directive_language("answer in japanese or answer in english"),
            Some(Language::En)
        );
    }

    #[test]
    fn test_resolve_output_language() {
        assert_eq!(
            resolve_output_language(Some("ja"), "answer in english", Language::En).unwrap(),
            Language::Ja
        );
        assert_eq!(
            resolve_output_language(Some(" "), "日本語で", Language::En).unwrap(),
            Language::Ja
        );
        assert_eq!(
            resolve_output_language(None, "sodium", Language::En).unwrap(),
            Language::En
        );
        assert!(matches!(
            resolve_output_language(Some("fr"), "sodium", Language::En),
            Err(Error::UnsupportedLanguage(_))
        ));
    }

    #[test]
    fn test_refine_query_trims() {
        assert_eq!(refine_query("  sodium intake \n"), "sodium intake");
    }

    #[test]
    fn test_template_quotes_leading_context() {
        let synthesizer = TemplateSynthesizer::new(5);
        let en = synthesizer.render("abcdefgh", Language::En);
        assert!(en.contains("\n\nabcde\n\n"));
        assert!(!en.contains("abcdef"));
        let ja = synthesizer.render("abc", Language::Ja);
        assert!(ja.starts_with("取得した医療ガイドライン"));
    }

    #[tokio::test]
    async fn test_same_language_skips_translation() {
        let dir = TempDir::new().unwrap();
        let translator = Arc::new(TaggingTranslator::default());
        let orchestrator = orchestrator(&dir, translator.clone());

        let answer = orchestrator.generate("  sodium intake ", None, 1).await.unwrap();
        assert_eq!(answer.refined_query, "sodium intake");
        assert_eq!(answer.language, Language::En);
        assert_eq!(answer.num_context_docs, 1);
        assert_eq!(answer.retrieved_context[0].filename, "bp.txt");
        assert!(answer.context.starts_with("[Document 1 - Source: bp.txt"));
        assert!(answer.response.starts_with("Based on the retrieved"));
        assert_eq!(translator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cross_language_translates() {
        let dir = TempDir::new().unwrap();
        let translator = Arc::new(TaggingTranslator::default());
        let orchestrator = orchestrator(&dir, translator.clone());

        let answer = orchestrator.generate("塩分について", Some("en"), 2).await.unwrap();
        assert_eq!(answer.debug_info.query_language, Language::Ja);
        assert_eq!(answer.debug_info.output_language, Language::En);
        assert!(answer.response.starts_with("[en] Based on the retrieved"));
        assert_eq!(translator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_translation_failure_falls_back() {
        let dir = TempDir::new().unwrap();
        let orchestrator = orchestrator(&dir, Arc::new(PassthroughTranslator));

        let answer = orchestrator
            .generate("Tell me about sodium intake and blood pressure, 日本語で", None, 1)
            .await
            .unwrap();
        assert_eq!(answer.debug_info.query_language, Language::En);
        assert_eq!(answer.language, Language::Ja);
        assert!(answer.response.starts_with("取得した医療ガイドライン"));
    }

    #[tokio::test]
    async fn test_unsupported_language() {
        let dir = TempDir::new().unwrap();
        let orchestrator = orchestrator(&dir, Arc::new(PassthroughTranslator));
        assert!(matches!(
            orchestrator.generate("sodium", Some("de"), 1).await,
            Err(Error::UnsupportedLanguage(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_index_is_not_found() {
        let dir = TempDir::new().unwrap();
        let orchestrator = AnswerOrchestrator::new(
            Retriever::new(
                Arc::new(VectorIndex::new(dir.path())),
                Arc::new(HashingEmbedder::new(16).unwrap()),
            ),
            Arc::new(ScriptDetector::new()),
            Arc::new(PassthroughTranslator),
        );
        assert!(matches!(
            orchestrator.generate("anything", None, 3).await,
            Err(Error::NoRelevantDocuments)
        ));
    }
}
