//! Term frequencies over lemmatized statements.
//!
//! The counts feed a word cloud, so common English words, words that are
//! everywhere in this corpus, and the author names that make up article
//! names are all dropped before counting.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// English stop words (the list used by scikit-learn's text vectorizers).
pub const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst",
    "amoungst", "amount", "an", "and", "another", "any", "anyhow", "anyone", "anything", "anyway",
    "anywhere", "are", "around", "as", "at", "back", "be", "became", "because", "become",
    "becomes", "becoming", "been", "before", "beforehand", "behind", "being", "below", "beside",
    "besides", "between", "beyond", "bill", "both", "bottom", "but", "by", "call", "can",
    "cannot", "cant", "co", "con", "could", "couldnt", "cry", "de", "describe", "detail", "do",
    "done", "down", "due", "during", "each", "eg", "eight", "either", "eleven", "else",
    "elsewhere", "empty", "enough", "etc", "even", "ever", "every", "everyone", "everything",
    "everywhere", "except", "few", "fifteen", "fifty", "fill", "find", "fire", "first", "five",
    "for", "former", "formerly", "forty", "found", "four", "from", "front", "full", "further",
    "get", "give", "go", "had", "has", "hasnt", "have", "he", "hence", "her", "here",
    "hereafter", "hereby", "herein", "hereupon", "hers", "herself", "him", "himself", "his",
    "how", "however", "hundred", "i", "ie", "if", "in", "inc", "indeed", "interest", "into",
    "is", "it", "its", "itself", "keep", "last", "latter", "latterly", "least", "less", "ltd",
    "made", "many", "may", "me", "meanwhile", "might", "mill", "mine", "more", "moreover",
    "most", "mostly", "move", "much", "must", "my", "myself", "name", "namely", "neither",
    "never", "nevertheless", "next", "nine", "no", "nobody", "none", "noone", "nor", "not",
    "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "one", "only", "onto", "or",
    "other", "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own", "part",
    "per", "perhaps", "please", "put", "rather", "re", "same", "see", "seem", "seemed",
    "seeming", "seems", "serious", "several", "she", "should", "show", "side", "since",
    "sincere", "six", "sixty", "so", "some", "somehow", "someone", "something", "sometime",
    "sometimes", "somewhere", "still", "such", "system", "take", "ten", "than", "that", "the",
    "their", "them", "themselves", "then", "thence", "there", "thereafter", "thereby",
    "therefore", "therein", "thereupon", "these", "they", "thick", "thin", "third", "this",
    "those", "though", "three", "through", "throughout", "thru", "thus", "to", "together", "too",
    "top", "toward", "towards", "twelve", "twenty", "two", "un", "under", "until", "up", "upon",
    "us", "very", "via", "was", "we", "well", "were", "what", "whatever", "when", "whence",
    "whenever", "where", "whereafter", "whereas", "whereby", "wherein", "whereupon", "wherever",
    "whether", "which", "while", "whither", "who", "whoever", "whole", "whom", "whose", "why",
    "will", "with", "within", "without", "would", "yet", "you", "your", "yours", "yourself",
    "yourselves",
];

/// Words too common in clinical articles to say anything about one.
pub const DOMAIN_STOP_WORDS: &[&str] = &["sref", "sbref", "patient", "study", "treatment", "use"];

/// Term frequency settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermsConfig {
    /// Extra stop words on top of the English list.
    #[serde(default = "default_stop_words")]
    pub stop_words: Vec<String>,
    /// Also drop every word that appears in an article name.
    #[serde(default = "default_true")]
    pub exclude_article_names: bool,
    /// Maximum number of terms reported.
    #[serde(default = "default_max_terms")]
    pub max_terms: usize,
}

fn default_stop_words() -> Vec<String> {
    DOMAIN_STOP_WORDS.iter().map(|w| w.to_string()).collect()
}

fn default_true() -> bool {
    true
}

fn default_max_terms() -> usize {
    5000
}

impl Default for TermsConfig {
    fn default() -> Self {
        Self {
            stop_words: default_stop_words(),
            exclude_article_names: true,
            max_terms: default_max_terms(),
        }
    }
}

/// Lowercased set of words excluded from counting.
#[derive(Debug, Clone, Default)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    /// The English list alone.
    pub fn english() -> Self {
        Self::default().with_words(ENGLISH_STOP_WORDS.iter().copied())
    }

    /// English plus the configured extra words.
    pub fn from_config(config: &TermsConfig) -> Self {
        Self::english().with_words(&config.stop_words)
    }

    pub fn with_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.words
            .extend(words.into_iter().map(|w| w.as_ref().to_lowercase()));
        self
    }

    /// Add each space-separated word of every article name.
    pub fn with_article_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.words.extend(
                name.as_ref()
                    .split_whitespace()
                    .map(|w| w.to_lowercase()),
            );
        }
        self
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// A term and how often it occurs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermCount {
    pub term: String,
    pub count: usize,
}

/// Count whitespace-separated terms that are not stop words.
///
/// Sorted by count (highest first), ties broken alphabetically, then cut to
/// `max_terms`.
pub fn term_frequencies<'a, I>(lemmas: I, stop_words: &StopWords, max_terms: usize) -> Vec<TermCount>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for term in lemmas.into_iter().flat_map(str::split_whitespace) {
        if !stop_words.contains(term) {
            *counts.entry(term).or_insert(0) += 1;
        }
    }

    let mut sorted: Vec<TermCount> = counts
        .into_iter()
        .map(|(term, count)| TermCount {
            term: term.to_string(),
            count,
        })
        .collect();
    sorted.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.term.cmp(&b.term)));
    sorted.truncate(max_terms);
    sorted
}
