//! Sentence boundary detection.
//!
//! Cleaned paragraphs are split into sentences by a `SentenceSegmenter`. The
//! built-in `RuleSegmenter` looks for terminal punctuation followed by
//! whitespace and a capitalised (or numeric) next token, and ignores common
//! abbreviations such as "Fig." or "e.g.".

use std::collections::HashSet;

use thiserror::Error;

/// Errors raised by a sentence segmenter.
#[derive(Debug, Error)]
pub enum SegmentError {
    #[error("Segmenter unavailable: {0}")]
    Unavailable(String),

    #[error("Segmentation failed: {0}")]
    Failed(String),
}

/// Splits a paragraph into sentences.
///
/// Implementations may be expensive to construct (a loaded language model),
/// so callers build one per worker and reuse it across documents.
pub trait SentenceSegmenter {
    fn segment(&self, paragraph: &str) -> Result<Vec<String>, SegmentError>;
}

/// Punctuation-driven sentence splitter.
pub struct RuleSegmenter {
    abbreviations: HashSet<String>,
}

impl RuleSegmenter {
    pub fn new() -> Self {
        // Abbreviations common in clinical and scientific prose
        let abbreviations = [
            "dr", "mr", "mrs", "ms", "prof", "sr", "jr", "inc", "ltd", "corp", "co", "e.g",
            "i.e", "vs", "etc", "approx", "ca", "cf", "al", "fig", "figs", "tab", "no", "nos",
            "vol", "ref", "refs", "resp", "suppl", "ed", "eds", "p", "pp", "dept", "st",
        ]
        .iter()
        .map(|a| a.to_string())
        .collect();

        Self { abbreviations }
    }

    pub fn with_custom_abbreviations(mut self, abbreviations: &[&str]) -> Self {
        for abbrev in abbreviations {
            self.abbreviations
                .insert(abbrev.trim_end_matches('.').to_lowercase());
        }
        self
    }

    fn is_terminal(c: char) -> bool {
        matches!(c, '.' | '?' | '!')
    }

    fn is_closing(c: char) -> bool {
        matches!(c, '"' | '\'' | ')' | ']')
    }

    /// Last whitespace-separated word before `end`, without opening brackets.
    fn word_before(text: &str, end: usize) -> &str {
        let head = &text[..end];
        let start = head
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace())
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        head[start..].trim_start_matches(['(', '[', '"', '\''])
    }

    fn is_abbreviation(&self, word: &str) -> bool {
        let normalized = word.trim_end_matches('.').to_lowercase();
        if self.abbreviations.contains(&normalized) {
            return true;
        }
        // Single-letter initials ("J. Smith")
        let mut chars = normalized.chars();
        matches!((chars.next(), chars.next()), (Some(c), None) if c.is_alphabetic())
    }

    fn starts_sentence(rest: &str) -> bool {
        match rest.trim_start().chars().next() {
            None => true,
            Some(c) => c.is_uppercase() || c.is_ascii_digit() || matches!(c, '"' | '\'' | '(' | '['),
        }
    }
}

impl Default for RuleSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

impl SentenceSegmenter for RuleSegmenter {
    fn segment(&self, paragraph: &str) -> Result<Vec<String>, SegmentError> {
        let chars: Vec<(usize, char)> = paragraph.char_indices().collect();
        let mut sentences = Vec::new();
        let mut start = 0;
        let mut i = 0;

        while i < chars.len() {
            let (pos, c) = chars[i];
            if !Self::is_terminal(c) {
                i += 1;
                continue;
            }

            // Absorb "?!", "..." and closing quotes or brackets
            let mut j = i + 1;
            while j < chars.len() && (Self::is_terminal(chars[j].1) || Self::is_closing(chars[j].1))
            {
                j += 1;
            }
            let end = chars.get(j).map(|&(p, _)| p).unwrap_or(paragraph.len());
            let at_break = j >= chars.len() || chars[j].1.is_whitespace();

            let is_boundary = at_break
                && Self::starts_sentence(&paragraph[end..])
                && !(c == '.' && self.is_abbreviation(Self::word_before(paragraph, pos)));

            if is_boundary {
                let sentence = paragraph[start..end].trim();
                if !sentence.is_empty() {
                    sentences.push(sentence.to_string());
                }
                start = end;
            }
            i = j;
        }

        let rest = paragraph[start..].trim();
        if !rest.is_empty() {
            sentences.push(rest.to_string());
        }

        Ok(sentences)
    }
}
