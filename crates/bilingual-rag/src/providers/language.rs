//! Language detection for documents and queries

use crate::types::document::Language;

/// Outcome of language detection
///
/// Detection never fails outright: when the text gives no usable signal the
/// detector reports a fallback language together with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    /// Language identified from the text
    Detected(Language),
    /// No confident result, `language` is the default
    Fallback { language: Language, reason: String },
}

impl Detection {
    /// The language to use, detected or defaulted
    pub fn language(&self) -> Language {
        match self {
            Self::Detected(language) | Self::Fallback { language, .. } => *language,
        }
    }

    /// Whether the result is a fallback
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

/// Trait for language detectors
pub trait LanguageDetector: Send + Sync {
    /// Detect the language of `text`
    fn detect(&self, text: &str) -> Detection;
}

/// Script-ratio detector
///
/// Counts kana and CJK ideographs against all alphabetic characters. Japanese
/// wins once they make up a fifth of the letters, since Japanese prose often
/// embeds Latin terms. Otherwise Latin letters must be at least half the
/// letters for English.
#[derive(Debug, Clone, Copy)]
pub struct ScriptDetector {
    japanese_ratio: f32,
}

impl Default for ScriptDetector {
    fn default() -> Self {
        Self { japanese_ratio: 0.2 }
    }
}

impl ScriptDetector {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LanguageDetector for ScriptDetector {
    fn detect(&self, text: &str) -> Detection {
        let mut letters = 0usize;
        let mut japanese = 0usize;
        let mut latin = 0usize;

        for c in text.chars().filter(|c| c.is_alphabetic()) {
            letters += 1;
            if is_japanese(c) {
                japanese += 1;
            } else if c.is_ascii_alphabetic() || matches!(c, '\u{00C0}'..='\u{024F}') {
                latin += 1;
            }
        }

        if letters == 0 {
            return Detection::Fallback {
                language: Language::En,
                reason: "no alphabetic characters".to_string(),
            };
        }

        if japanese as f32 / letters as f32 >= self.japanese_ratio {
            Detection::Detected(Language::Ja)
        } else if latin * 2 >= letters {
            Detection::Detected(Language::En)
        } else {
            Detection::Fallback {
                language: Language::En,
                reason: "script is neither Latin nor Japanese".to_string(),
            }
        }
    }
}

fn is_japanese(c: char) -> bool {
    matches!(
        c,
        '\u{3040}'..='\u{309F}'   // hiragana
            | '\u{30A0}'..='\u{30FF}' // katakana
            | '\u{31F0}'..='\u{31FF}'
            | '\u{FF66}'..='\u{FF9D}' // half-width katakana
            | '\u{3400}'..='\u{4DBF}'
            | '\u{4E00}'..='\u{9FFF}' // CJK unified ideographs
            | '\u{F900}'..='\u{FAFF}'
            | '\u{3005}'
    )
}
