//! Context assembly from ranked retrieval results

use crate::types::RetrievalResult;

/// Appended to context cut at the length cap
pub const TRUNCATION_MARKER: &str = "...\n[Context truncated]";

/// Default cap on assembled context, in characters
pub const DEFAULT_MAX_CONTEXT_CHARS: usize = 2000;

/// Formats ranked results into labeled context blocks
#[derive(Debug, Clone, Copy)]
pub struct ContextAssembler {
    max_chars: usize,
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CONTEXT_CHARS,
        }
    }
}

impl ContextAssembler {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Format one result as a labeled block
    ///
    /// `rank` is 1-based.
    pub fn format_block(rank: usize, result: &RetrievalResult) -> String {
        format!(
            "[Document {} - Source: {}, Language: {}, Relevance: {:.4}]\n{}\n",
            rank,
            result.chunk.filename,
            result.chunk.language,
            result.similarity_score,
            result.chunk.text
        )
    }

    /// Concatenate the blocks of `results` in rank order
    pub fn assemble(results: &[RetrievalResult]) -> String {
        let mut context = String::new();
        for (i, result) in results.iter().enumerate() {
            if i > 0 {
                context.push('\n');
            }
            context.push_str(&Self::format_block(i + 1, result));
        }
        context
    }

    /// Cut formatted context to the character cap and mark the cut
    pub fn bound(&self, context: &str) -> String {
        match context.char_indices().nth(self.max_chars) {
            Some((cut, _)) => format!("{}{}", &context[..cut], TRUNCATION_MARKER),
            None => context.to_string(),
        }
    }

    /// Assemble and bound in one step
    pub fn build(&self, results: &[RetrievalResult]) -> String {
        self.bound(&Self::assemble(results))
    }
}
