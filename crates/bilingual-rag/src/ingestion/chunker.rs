//! Overlapping character-window chunking

use crate::error::{Error, Result};

/// Splits text into overlapping pieces of at most `chunk_size` characters
///
/// Consecutive pieces share exactly `overlap` characters, so dropping the
/// first `overlap` characters of every piece after the first and
/// concatenating reconstructs the input. Within a window the cut prefers to
/// land just after whitespace or punctuation, but never earlier than half a
/// window.
#[derive(Debug, Clone, Copy)]
pub struct TextChunker {
    /// Maximum chunk size in characters
    chunk_size: usize,
    /// Characters repeated between consecutive chunks
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 || overlap == 0 {
            return Err(Error::invalid_argument(format!(
                "chunk_size ({}) and overlap ({}) must both be positive",
                chunk_size, overlap
            )));
        }
        if overlap >= chunk_size {
            return Err(Error::invalid_argument(format!(
                "overlap ({}) must be smaller than chunk_size ({})",
                overlap, chunk_size
            )));
        }
        Ok(Self { chunk_size, overlap })
    }

    /// Maximum chunk size in characters
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Overlap in characters
    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split `text` into ordered, overlapping pieces
    ///
    /// Empty or whitespace-only input yields no pieces.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let total = chars.len();
        let byte_at = |pos: usize| chars.get(pos).map_or(text.len(), |(offset, _)| *offset);

        let mut pieces = Vec::new();
        let mut start = 0usize;

        loop {
            let hard_end = (start + self.chunk_size).min(total);
            let end = if hard_end == total {
                total
            } else {
                self.break_point(&chars, start, hard_end)
            };

            pieces.push(text[byte_at(start)..byte_at(end)].to_string());

            if end == total {
                break;
            }
            start = end - self.overlap;
        }

        pieces
    }

    /// Choose where the window `[start, hard_end)` ends
    ///
    /// The returned end is always greater than `start + overlap`, so the next
    /// window starts strictly after this one.
    fn break_point(&self, chars: &[(usize, char)], start: usize, hard_end: usize) -> usize {
        let min_end = (start + self.overlap + 1).max(start + self.chunk_size / 2);

        (min_end..=hard_end)
            .rev()
            .find(|&end| is_break_char(chars[end - 1].1))
            .unwrap_or(hard_end)
    }
}

/// Characters after which a cut reads naturally
fn is_break_char(c: char) -> bool {
    c.is_whitespace()
        || matches!(
            c,
            '.' | ',' | ';' | ':' | '!' | '?' | '。' | '、' | '！' | '？' | '．' | '，'
        )
}

/// Split `text` with the given parameters
pub fn chunk(text: &str, max_chunk_size: usize, overlap: usize) -> Result<Vec<String>> {
    Ok(TextChunker::new(max_chunk_size, overlap)?.chunk(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SCENARIO: &str =
        "Patients with hypertension should reduce sodium intake. Regular exercise is recommended.";

    fn reassemble(pieces: &[String], overlap: usize) -> String {
        let mut out = String::new();
        for (i, piece) in pieces.iter().enumerate() {
            if i == 0 {
                out.push_str(piece);
            } else {
                out.extend(piece.chars().skip(overlap));
            }
        }
        out
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(matches!(TextChunker::new(0, 0), Err(Error::InvalidArgument(_))));
        assert!(matches!(TextChunker::new(40, 0), Err(Error::InvalidArgument(_))));
        assert!(matches!(TextChunker::new(40, 40), Err(Error::InvalidArgument(_))));
        assert!(matches!(TextChunker::new(40, 50), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_blank_input() {
        let chunker = TextChunker::new(40, 10).unwrap();
        assert!(chunker.chunk("").is_empty());
        assert!(chunker.chunk(" \n\t ").is_empty());
    }

    #[test]
    fn test_short_text_single_piece() {
        let pieces = chunk("Drink water.", 40, 10).unwrap();
        assert_eq!(pieces, vec!["Drink water.".to_string()]);
    }

    #[test]
    fn test_scenario_chunks() {
        let pieces = chunk(SCENARIO, 40, 10).unwrap();

        assert!(pieces.len() >= 2);
        for piece in &pieces {
            assert!(piece.chars().count() <= 40, "piece too long: {:?}", piece);
        }
        for pair in pieces.windows(2) {
            let prev: Vec<char> = pair[0].chars().collect();
            let suffix: String = prev[prev.len() - 10..].iter().collect();
            let prefix: String = pair[1].chars().take(10).collect();
            assert_eq!(suffix, prefix);
        }
        assert!(pieces.iter().any(|p| p.contains("sodium")));
        assert_eq!(reassemble(&pieces, 10), SCENARIO);
    }

    #[test]
    fn test_prefers_whitespace_cut() {
        let pieces = chunk(SCENARIO, 40, 10).unwrap();
        assert_eq!(pieces[0], "Patients with hypertension should ");
    }

    #[test]
    fn test_japanese_text() {
        let text = "高血圧の患者は塩分の摂取を控えるべきです。定期的な運動が推奨されます。睡眠も大切です。";
        let pieces = chunk(text, 12, 3).unwrap();
        assert!(pieces.len() > 1);
        for piece in &pieces {
            assert!(piece.chars().count() <= 12);
        }
        assert_eq!(reassemble(&pieces, 3), text);
    }

    #[test]
    fn test_no_break_characters() {
        let text = "x".repeat(95);
        let pieces = chunk(&text, 40, 10).unwrap();
        assert_eq!(pieces.len(), 3);
        assert_eq!(pieces[2].chars().count(), 35);
        assert_eq!(reassemble(&pieces, 10), text);
    }

    proptest! {
        #[test]
        fn prop_chunk_coverage(
            text in "[a-z .。あ-ん]{1,400}",
            size in 2usize..80,
            overlap_seed in 1usize..80,
        ) {
            let overlap = 1 + overlap_seed % (size - 1);
            let pieces = chunk(&text, size, overlap).unwrap();

            if text.trim().is_empty() {
                prop_assert!(pieces.is_empty());
            } else {
                for piece in &pieces {
                    prop_assert!(!piece.is_empty());
                    prop_assert!(piece.chars().count() <= size);
                }
                prop_assert_eq!(reassemble(&pieces, overlap), text);
            }
        }
    }
}
