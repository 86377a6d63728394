//! Translation between the supported languages

use async_trait::async_trait;
use std::sync::Arc;

use crate::types::document::Language;

use super::ollama::OllamaClient;

/// Outcome of a translation attempt
///
/// Translation failures are never raised. The caller gets the original text
/// back together with the reason it was not translated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    /// Successfully translated text
    Translated(String),
    /// Untranslated input and the reason
    Fallback { text: String, reason: String },
}

impl Translation {
    /// Resulting text, translated or original
    pub fn into_text(self) -> String {
        match self {
            Self::Translated(text) | Self::Fallback { text, .. } => text,
        }
    }
}

/// Trait for translation backends
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` into `target`
    async fn translate(&self, text: &str, target: Language, source: Option<Language>)
        -> Translation;

    /// Get translator name for logging
    fn name(&self) -> &str;
}

/// Translator used when no backend is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughTranslator;

#[async_trait]
impl Translator for PassthroughTranslator {
    async fn translate(
        &self,
        text: &str,
        _target: Language,
        _source: Option<Language>,
    ) -> Translation {
        Translation::Fallback {
            text: text.to_string(),
            reason: "translation is disabled".to_string(),
        }
    }

    fn name(&self) -> &str {
        "passthrough"
    }
}

/// Prompted translation through an Ollama model
pub struct OllamaTranslator {
    client: Arc<OllamaClient>,
    model: String,
    temperature: f32,
}

impl OllamaTranslator {
    pub fn new(client: Arc<OllamaClient>, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            client,
            model: model.into(),
            temperature,
        }
    }

    fn build_prompt(text: &str, target: Language, source: Option<Language>) -> String {
        let from = source
            .map(|lang| format!(" from {}", language_name(lang)))
            .unwrap_or_default();
        format!(
            "Translate the following text{} into {}. \
             Output only the translation, with no notes or explanations.\n\n{}",
            from,
            language_name(target),
            text
        )
    }
}

fn language_name(language: Language) -> &'static str {
    match language {
        Language::En => "English",
        Language::Ja => "Japanese",
    }
}

#[async_trait]
impl Translator for OllamaTranslator {
    async fn translate(&self, text: &str, target: Language, source: Option<Language>) -> Translation {
        if source == Some(target) || text.trim().is_empty() {
            return Translation::Translated(text.to_string());
        }

        let prompt = Self::build_prompt(text, target, source);
        match self
            .client
            .generate(&self.model, &prompt, self.temperature)
            .await
        {
            Ok(output) if !output.trim().is_empty() => {
                Translation::Translated(output.trim().to_string())
            }
            Ok(_) => Translation::Fallback {
                text: text.to_string(),
                reason: "model returned an empty translation".to_string(),
            },
            Err(e) => Translation::Fallback {
                text: text.to_string(),
                reason: e.to_string(),
            },
        }
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OllamaConfig;

    fn unreachable_client() -> Arc<OllamaClient> {
        let config = OllamaConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1,
            max_retries: 0,
        };
        Arc::new(OllamaClient::new(&config).unwrap())
    }

    #[tokio::test]
    async fn test_passthrough_reports_fallback() {
        let result = PassthroughTranslator
            .translate("hello", Language::Ja, Some(Language::En))
            .await;
        assert!(matches!(result, Translation::Fallback { ref text, .. } if text == "hello"));
    }

    #[tokio::test]
    async fn test_ollama_failure_returns_original() {
        let translator = OllamaTranslator::new(unreachable_client(), "llama3.2:3b", 0.1);
        let result = translator
            .translate("塩分を控える", Language::En, Some(Language::Ja))
            .await;
        assert_eq!(result.into_text(), "塩分を控える");
    }

    #[tokio::test]
    async fn test_same_language_is_noop() {
        let translator = OllamaTranslator::new(unreachable_client(), "llama3.2:3b", 0.1);
        let result = translator
            .translate("hello", Language::En, Some(Language::En))
            .await;
        assert_eq!(result, Translation::Translated("hello".to_string()));
    }

    #[test]
    fn test_prompt_names_languages() {
        let prompt = OllamaTranslator::build_prompt("hi", Language::Ja, Some(Language::En));
        assert!(prompt.contains("from English into Japanese"));
        assert!(prompt.ends_with("hi"));
    }
}
