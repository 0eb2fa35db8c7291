//! Word tokenization for lemma text and term counting.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Runs of letters (word characters that are not digits).
static ALPHABETIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\W\d]+").unwrap());

/// Shortest token kept, in characters.
pub const MIN_TOKEN_LEN: usize = 2;
/// Longest token kept, in characters.
pub const MAX_TOKEN_LEN: usize = 15;

/// Strip diacritics by decomposing and dropping combining marks.
pub fn deaccent(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Lowercase, accent-folded alphabetic tokens joined by single spaces.
///
/// Tokens shorter than `MIN_TOKEN_LEN`, longer than `MAX_TOKEN_LEN`, or
/// starting with an underscore are dropped.
pub fn tokenize(text: &str) -> String {
    let folded = deaccent(text).to_lowercase();
    ALPHABETIC
        .find_iter(&folded)
        .map(|m| m.as_str())
        .filter(|token| {
            let len = token.chars().count();
            (MIN_TOKEN_LEN..=MAX_TOKEN_LEN).contains(&len) && !token.starts_with('_')
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deaccent() {
        assert_eq!(deaccent("Urtikaria f\u{fc}r Kr\u{e4}tze"), "Urtikaria fur Kratze");
        assert_eq!(deaccent("plain"), "plain");
    }

    #[test]
    fn test_tokenize_lowercases_and_drops_numbers() {
        assert_eq!(tokenize("Chronic Urticaria affects 1% of adults."), "chronic urticaria affects of adults");
    }

    #[test]
    fn test_tokenize_length_limits() {
        assert_eq!(tokenize("a an immunoglobulinopathy ok"), "an ok");
        assert_eq!(tokenize("H1-antihistamine"), "antihistamine");
    }

    #[test]
    fn test_tokenize_underscore_prefix() {
        assert_eq!(tokenize("_hidden visible"), "visible");
    }

    #[test]
    fn test_tokenize_empty() {
        assert_eq!(tokenize(""), "");
        assert_eq!(tokenize("12 34 !!"), "");
    }
}
