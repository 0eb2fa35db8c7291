//! Statement extraction from raw document text.
//!
//! Extracted PDF text arrives hard-wrapped, full of figure numbers, URLs and
//! citation markers. `Normalizer` filters it down to printable ASCII, rejoins
//! wrapped lines into paragraphs, scrubs each paragraph and hands the result to
//! a `SentenceSegmenter`.

use std::collections::VecDeque;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use super::segment::{SegmentError, SentenceSegmenter};

static LEADING_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s?\d+(.*)$").unwrap());
static SPLIT_HYPHEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s?-\s?").unwrap());
static SPACE_BEFORE_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s?([,:;.])").unwrap());
static LONG_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{5,}").unwrap());
static URL_LOOSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"((http|https)://)?[a-zA-Z0-9./?:@\-_=#]+\.[a-zA-Z]{2,6}[a-zA-Z0-9.&/?:@\-_=#]*")
        .unwrap()
});
static URL_STRICT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"https?://(?:www\.)?[a-zA-Z0-9][a-zA-Z0-9-]+[a-zA-Z0-9]\.\S{2,}",
        r"|www\.[a-zA-Z0-9][a-zA-Z0-9-]+[a-zA-Z0-9]\.\S{2,}",
        r"|https?://(?:www\.)?[a-zA-Z0-9]+\.\S{2,}",
        r"|www\.[a-zA-Z0-9]+\.\S{2,}",
    ))
    .unwrap()
});
static CITATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\d+(,\s*\d+)*\]").unwrap());
static NON_ASCII: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\x00-\x7F]+").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"( +)").unwrap());
static ASIDE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\(.*?\))|(\[.*?\])").unwrap());
static SPACE_THEN_PUNCT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" ([,:;.])").unwrap());

/// Options for paragraph reconstruction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizerConfig {
    /// Drop all-uppercase lines (section headers) before reflowing.
    #[serde(default)]
    pub skip_headers: bool,
}

/// Keep only printable ASCII: graphic characters plus space, tab, newline,
/// carriage return, vertical tab and form feed.
pub fn remove_non_ascii(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_graphic() || matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c'))
        .collect()
}

/// Whether a line looks like a section header: it has at least one cased
/// character and none of them are lowercase.
pub fn is_header(line: &str) -> bool {
    line.chars().any(char::is_uppercase) && !line.chars().any(char::is_lowercase)
}

/// Scrub a single reflowed paragraph.
///
/// The substitutions run in a fixed order; later ones assume the output of
/// earlier ones (URL matching relies on spaces before dots already being gone,
/// bracket removal relies on whitespace already being collapsed). Removing an
/// aside can expose a leading number or a split hyphen that earlier steps
/// already passed, so the passes repeat until the text stops changing. Cleaning
/// an already-clean paragraph is therefore a no-op.
pub fn clean_paragraph(paragraph: &str) -> String {
    let mut current = clean_pass(paragraph);
    loop {
        // A pass never lengthens the text; an equal-length change only turns
        // whitespace into single spaces, so this reaches a fixed point.
        let next = clean_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn clean_pass(paragraph: &str) -> String {
    let line = LEADING_NUMBER.replace(paragraph, "${1}");
    let line = line.trim();
    let line = SPLIT_HYPHEN.replace_all(line, "-");
    let line = SPACE_BEFORE_PUNCT.replace_all(&line, "${1}");
    let line = LONG_NUMBER.replace_all(&line, " ");
    let line = URL_LOOSE.replace_all(&line, " ");
    let line = URL_STRICT.replace_all(&line, |caps: &Captures| {
        let found = &caps[0];
        if is_bare_www_host(found) {
            found.to_string()
        } else {
            "link".to_string()
        }
    });
    let line = CITATION.replace_all(&line, "");
    let line = NON_ASCII.replace_all(&line, " ");
    let line = WHITESPACE.replace_all(&line, " ");
    let line = SPACES.replace_all(&line, " ");
    let line = ASIDE.replace_all(&line, "");

    let line = WHITESPACE.replace_all(&line, " ");
    let line = SPACE_THEN_PUNCT.replace_all(&line, "${1}");
    line.trim().to_string()
}

/// A scheme followed by a host that starts with "www" but not "www." is not
/// treated as a URL by the strict pass.
fn is_bare_www_host(found: &str) -> bool {
    match found.split_once("://") {
        Some((_, host)) => host.starts_with("www") && !host.starts_with("www."),
        None => false,
    }
}

/// Turns raw document text into cleaned statements.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizerConfig,
}

impl Normalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Rebuild paragraphs from hard-wrapped lines.
    ///
    /// A line continues the current paragraph when it starts with a space or
    /// when the paragraph so far does not end with a period. The trailing
    /// paragraph is always emitted, even when empty.
    pub fn paragraphs(&self, text: &str) -> Vec<String> {
        let text = remove_non_ascii(text);
        let mut paragraphs = Vec::new();
        let mut current = String::new();

        for line in text.split('\n') {
            if self.config.skip_headers && is_header(line) {
                continue;
            }
            if line.starts_with(' ') || !current.ends_with('.') {
                current.push(' ');
                current.push_str(line);
            } else {
                paragraphs.push(std::mem::replace(&mut current, line.to_string()));
            }
        }
        paragraphs.push(current);

        paragraphs
    }

    /// Lazily clean and segment `text`.
    ///
    /// Each call starts from the beginning, so the sequence can be replayed by
    /// calling again with the same input.
    pub fn statements<'a, S>(&'a self, text: &str, segmenter: &'a S) -> Statements<'a, S>
    where
        S: SentenceSegmenter + ?Sized,
    {
        Statements {
            segmenter,
            paragraphs: self.paragraphs(text).into_iter(),
            pending: VecDeque::new(),
        }
    }

    /// Clean and segment `text`, stopping at the first segmenter failure.
    pub fn extract_statements<S>(&self, text: &str, segmenter: &S) -> Result<Vec<String>, SegmentError>
    where
        S: SentenceSegmenter + ?Sized,
    {
        self.statements(text, segmenter).collect()
    }
}

/// Iterator over the statements of one document, in paragraph order and then
/// sentence order. Sentences are trimmed but may be empty.
pub struct Statements<'a, S: ?Sized> {
    segmenter: &'a S,
    paragraphs: std::vec::IntoIter<String>,
    pending: VecDeque<String>,
}

impl<S> Iterator for Statements<'_, S>
where
    S: SentenceSegmenter + ?Sized,
{
    type Item = Result<String, SegmentError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(sentence) = self.pending.pop_front() {
                return Some(Ok(sentence));
            }

            let paragraph = self.paragraphs.next()?;
            let cleaned = clean_paragraph(&paragraph);
            match self.segmenter.segment(&cleaned) {
                Ok(sentences) => self
                    .pending
                    .extend(sentences.into_iter().map(|s| s.trim().to_string())),
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::segment::RuleSegmenter;

    struct WholeParagraph;

    impl SentenceSegmenter for WholeParagraph {
        fn segment(&self, paragraph: &str) -> Result<Vec<String>, SegmentError> {
            Ok(vec![format!("  {}  ", paragraph)])
        }
    }

    struct Failing;

    impl SentenceSegmenter for Failing {
        fn segment(&self, _paragraph: &str) -> Result<Vec<String>, SegmentError> {
            Err(SegmentError::Failed("model not loaded".to_string()))
        }
    }

    #[test]
    fn test_remove_non_ascii() {
        assert_eq!(remove_non_ascii("caf\u{e9} \u{2013} ok\t\n"), "caf  ok\t\n");
        assert_eq!(remove_non_ascii("a\u{0}b\u{7f}c"), "abc");
    }

    #[test]
    fn test_is_header() {
        assert!(is_header("INTRODUCTION"));
        assert!(is_header("2. METHODS AND MATERIALS"));
        assert!(!is_header("Introduction"));
        assert!(!is_header("1234"));
        assert!(!is_header(""));
    }

    #[test]
    fn test_reflow_joins_wrapped_lines() {
        let normalizer = Normalizer::default();
        let text = "Line one of\na paragraph.\nSecond paragraph starts.\n continued here.";
        assert_eq!(
            normalizer.paragraphs(text),
            vec![
                " Line one of a paragraph.".to_string(),
                "Second paragraph starts.  continued here.".to_string(),
            ]
        );
    }

    #[test]
    fn test_reflow_empty_text_emits_leftover() {
        let normalizer = Normalizer::default();
        assert_eq!(normalizer.paragraphs(""), vec![" ".to_string()]);
    }

    #[test]
    fn test_reflow_headers_kept_by_default() {
        let text = "First sentence.\nRESULTS\nSecond sentence.";
        let kept = Normalizer::default().paragraphs(text);
        assert_eq!(kept, vec![" First sentence.".to_string(), "RESULTS Second sentence.".to_string()]);

        let skipping = Normalizer::new(NormalizerConfig { skip_headers: true });
        assert_eq!(
            skipping.paragraphs(text),
            vec![" First sentence.".to_string(), "Second sentence.".to_string()]
        );
    }

    #[test]
    fn test_clean_scenario() {
        let cleaned = clean_paragraph(
            "  Patient   shows urticaria (see Fig.1) [3,4] at http://example.com/page ",
        );
        assert_eq!(cleaned, "Patient shows urticaria at");
        assert!(!cleaned.contains('('));
        assert!(!cleaned.contains('['));
        assert!(!cleaned.contains("http"));
        assert!(!cleaned.contains("  "));
        assert_eq!(cleaned, cleaned.trim());
    }

    #[test]
    fn test_clean_is_idempotent() {
        let paragraph = "Chronic urticaria affects 1% of the population (see review) [12, 13]. \
                         Symptoms persist for more than six weeks, see http://example.org/guide.";
        let once = clean_paragraph(paragraph);
        assert_eq!(
            once,
            "Chronic urticaria affects 1% of the population. \
             Symptoms persist for more than six weeks, see"
        );
        assert_eq!(clean_paragraph(&once), once);
    }

    #[test]
    fn test_clean_rejoins_after_aside_removal() {
        let hyphen = clean_paragraph(
            "Histamine release is IgE (immunoglobulin E)- mediated in most patients.",
        );
        assert_eq!(hyphen, "Histamine release is IgE-mediated in most patients.");
        assert_eq!(clean_paragraph(&hyphen), hyphen);

        let number = clean_paragraph("(Table 2) 40 patients were enrolled in the trial.");
        assert_eq!(number, "patients were enrolled in the trial.");
        assert_eq!(clean_paragraph(&number), number);
    }

    #[test]
    fn test_clean_strict_url_pass() {
        // Numeric hosts escape the loose pattern and are rewritten by the strict one
        assert_eq!(clean_paragraph("see http://10.20.30.40/x now"), "see link now");
        // A host starting with "www" but not "www." is left alone
        assert_eq!(
            clean_paragraph("mirror at http://wwwab.12/x today"),
            "mirror at http://wwwab.12/x today"
        );
        assert!(is_bare_www_host("http://wwwab.12/x"));
        assert!(!is_bare_www_host("http://www.ab.12/x"));
        assert!(!is_bare_www_host("www.ab.12"));
    }

    #[test]
    fn test_clean_individual_steps() {
        assert_eq!(clean_paragraph(" 12 Introduction to the topic"), "Introduction to the topic");
        assert_eq!(clean_paragraph("anti - histamine therapy"), "anti-histamine therapy");
        assert_eq!(clean_paragraph("mast cells , basophils ; and more ."), "mast cells, basophils; and more.");
        assert_eq!(clean_paragraph("sample 1234567 was lost"), "sample was lost");
        assert_eq!(clean_paragraph("as shown [1, 2,3] before"), "as shown before");
    }

    #[test]
    fn test_statements_trimmed_in_order() {
        let normalizer = Normalizer::default();
        let text = "First paragraph ends here.\nSecond paragraph too.";
        let statements = normalizer.extract_statements(text, &WholeParagraph).unwrap();
        assert_eq!(
            statements,
            vec!["First paragraph ends here.".to_string(), "Second paragraph too.".to_string()]
        );
    }

    #[test]
    fn test_statements_restartable() {
        let normalizer = Normalizer::default();
        let segmenter = RuleSegmenter::new();
        let text = "Urticaria is common. It affects many people.\nTreatment varies (see below).";
        let first: Vec<_> = normalizer
            .statements(text, &segmenter)
            .collect::<Result<_, _>>()
            .unwrap();
        let second: Vec<_> = normalizer
            .statements(text, &segmenter)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first,
            vec![
                "Urticaria is common.".to_string(),
                "It affects many people.".to_string(),
                "Treatment varies.".to_string(),
            ]
        );
    }

    #[test]
    fn test_segmenter_failure_propagates() {
        let normalizer = Normalizer::default();
        let result = normalizer.extract_statements("Some text.", &Failing);
        assert!(matches!(result, Err(SegmentError::Failed(_))));
    }
}
