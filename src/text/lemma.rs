//! Lemmatization of statements.
//!
//! A `Morphology` backend maps each token to its lemma. Pronouns are reported
//! with the `PRONOUN_LEMMA` placeholder and dropped from the lemma text, which
//! is then re-tokenized.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use super::tokenize::tokenize;

/// Lemma placeholder reported for pronouns.
pub const PRONOUN_LEMMA: &str = "-PRON-";

static TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+|[^\w\s]").unwrap());

const PRONOUNS: &[&str] = &[
    "i", "me", "my", "mine", "myself", "you", "your", "yours", "yourself", "yourselves", "he",
    "him", "his", "himself", "she", "her", "hers", "herself", "it", "its", "itself", "we", "us",
    "our", "ours", "ourselves", "they", "them", "their", "theirs", "themselves",
];

static IRREGULAR: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    [
        ("am", "be"), ("is", "be"), ("are", "be"), ("was", "be"), ("were", "be"),
        ("been", "be"), ("being", "be"), ("has", "have"), ("had", "have"),
        ("having", "have"), ("does", "do"), ("did", "do"), ("done", "do"),
        ("doing", "do"), ("went", "go"), ("gone", "go"), ("made", "make"),
        ("took", "take"), ("taken", "take"), ("gave", "give"), ("given", "give"),
        ("saw", "see"), ("seen", "see"), ("found", "find"), ("shown", "show"),
        ("began", "begin"), ("begun", "begin"), ("led", "lead"), ("felt", "feel"),
        ("children", "child"), ("men", "man"), ("women", "woman"), ("feet", "foot"),
        ("teeth", "tooth"), ("mice", "mouse"), ("analyses", "analysis"),
        ("diagnoses", "diagnosis"), ("using", "use"), ("during", "during"),
        ("this", "this"), ("thus", "thus"), ("various", "various"),
    ]
    .into_iter()
    .collect()
});

/// A token and its lemma.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzedToken {
    pub text: String,
    pub lemma: String,
}

/// Morphological analysis backend.
///
/// Like `SentenceSegmenter`, implementations are built once per worker.
pub trait Morphology {
    fn analyze(&self, text: &str) -> Vec<AnalyzedToken>;
}

/// Lemmatize `text`: drop pronouns, join the lemmas and tokenize the result.
pub fn lemmatize<M>(morphology: &M, text: &str) -> String
where
    M: Morphology + ?Sized,
{
    let lemmas: Vec<String> = morphology
        .analyze(text)
        .into_iter()
        .filter(|token| token.lemma != PRONOUN_LEMMA)
        .map(|token| token.lemma)
        .collect();
    tokenize(&lemmas.join(" "))
}

/// English lemmatizer built from a pronoun list, irregular forms and
/// inflectional suffix rules.
#[derive(Debug, Clone, Default)]
pub struct RuleLemmatizer;

impl RuleLemmatizer {
    pub fn new() -> Self {
        Self
    }

    pub fn lemma(&self, word: &str) -> String {
        let lower = word.to_lowercase();

        if PRONOUNS.contains(&lower.as_str()) {
            return PRONOUN_LEMMA.to_string();
        }
        if let Some(lemma) = IRREGULAR.get(lower.as_str()) {
            return lemma.to_string();
        }
        if !lower.chars().all(|c| c.is_ascii_alphabetic()) {
            return lower;
        }

        strip_suffix(&lower).unwrap_or(lower)
    }
}

impl Morphology for RuleLemmatizer {
    fn analyze(&self, text: &str) -> Vec<AnalyzedToken> {
        TOKEN
            .find_iter(text)
            .map(|m| AnalyzedToken {
                text: m.as_str().to_string(),
                lemma: self.lemma(m.as_str()),
            })
            .collect()
    }
}

fn has_vowel(s: &str) -> bool {
    s.chars().any(|c| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y'))
}

fn is_consonant(c: char) -> bool {
    c.is_ascii_alphabetic() && !matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

/// Inflectional suffix rules, in order of specificity. Input is lowercase ASCII.
fn strip_suffix(word: &str) -> Option<String> {
    let len = word.len();

    if len > 4 && word.ends_with("ies") {
        return Some(format!("{}y", &word[..len - 3]));
    }
    if word.ends_with("sses") {
        return Some(word[..len - 2].to_string());
    }
    if ["ches", "shes", "xes", "zes"].iter().any(|s| word.ends_with(s)) {
        return Some(word[..len - 2].to_string());
    }
    if len > 3
        && word.ends_with('s')
        && !["ss", "us", "is", "ous"].iter().any(|s| word.ends_with(s))
    {
        return Some(word[..len - 1].to_string());
    }
    if len > 4 && word.ends_with("ied") {
        return Some(format!("{}y", &word[..len - 3]));
    }
    if len > 5 && word.ends_with("ing") {
        return verb_stem(&word[..len - 3]);
    }
    if len > 4 && word.ends_with("ed") {
        return verb_stem(&word[..len - 2]);
    }
    None
}

/// Repair a verb stem after removing "-ing"/"-ed": undouble a final consonant
/// ("stopp" -> "stop") or restore a silent "e" ("caus" -> "cause").
fn verb_stem(stem: &str) -> Option<String> {
    if !has_vowel(stem) {
        return None;
    }

    let chars: Vec<char> = stem.chars().collect();
    let n = chars.len();
    if n >= 2 {
        let (last, prev) = (chars[n - 1], chars[n - 2]);
        if last == prev && is_consonant(last) && !matches!(last, 'l' | 's' | 'z') {
            return Some(stem[..stem.len() - 1].to_string());
        }
        if matches!(last, 'c' | 's' | 'v' | 'z') && !is_consonant(prev) {
            return Some(format!("{}e", stem));
        }
        if n >= 3 && stem.ends_with("at") && is_consonant(chars[n - 3]) {
            return Some(format!("{}e", stem));
        }
    }
    Some(stem.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pronouns_get_placeholder() {
        let lemmatizer = RuleLemmatizer::new();
        assert_eq!(lemmatizer.lemma("They"), PRONOUN_LEMMA);
        assert_eq!(lemmatizer.lemma("its"), PRONOUN_LEMMA);
    }

    #[test]
    fn test_irregular_forms() {
        let lemmatizer = RuleLemmatizer::new();
        assert_eq!(lemmatizer.lemma("were"), "be");
        assert_eq!(lemmatizer.lemma("Children"), "child");
        assert_eq!(lemmatizer.lemma("diagnoses"), "diagnosis");
    }

    #[test]
    fn test_suffix_rules() {
        let lemmatizer = RuleLemmatizer::new();
        assert_eq!(lemmatizer.lemma("patients"), "patient");
        assert_eq!(lemmatizer.lemma("therapies"), "therapy");
        assert_eq!(lemmatizer.lemma("rashes"), "rash");
        assert_eq!(lemmatizer.lemma("stopped"), "stop");
        assert_eq!(lemmatizer.lemma("caused"), "cause");
        assert_eq!(lemmatizer.lemma("treated"), "treat");
        assert_eq!(lemmatizer.lemma("related"), "relate");
        assert_eq!(lemmatizer.lemma("itching"), "itch");
        assert_eq!(lemmatizer.lemma("called"), "call");
        assert_eq!(lemmatizer.lemma("thing"), "thing");
        assert_eq!(lemmatizer.lemma("nervous"), "nervous");
        assert_eq!(lemmatizer.lemma("H1"), "h1");
    }

    #[test]
    fn test_lemmatize_drops_pronouns_and_numbers() {
        let lemmatizer = RuleLemmatizer::new();
        assert_eq!(
            lemmatize(&lemmatizer, "They were treated with 2 antihistamines."),
            "be treat with antihistamine"
        );
    }

    #[test]
    fn test_lemmatize_empty() {
        assert_eq!(lemmatize(&RuleLemmatizer::new(), ""), "");
    }
}
