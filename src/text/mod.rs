//! Text processing for extracted article content.
//!
//! - `normalize`: ASCII filtering, paragraph reflow and paragraph cleanup
//! - `segment`: sentence boundary detection behind the `SentenceSegmenter` trait
//! - `tokenize`: lowercase, accent-folded word tokenization
//! - `lemma`: lemmatization behind the `Morphology` trait

pub mod lemma;
pub mod normalize;
pub mod segment;
pub mod tokenize;

pub use lemma::{lemmatize, AnalyzedToken, Morphology, RuleLemmatizer, PRONOUN_LEMMA};
pub use normalize::{
    clean_paragraph, is_header, remove_non_ascii, Normalizer, NormalizerConfig, Statements,
};
pub use segment::{RuleSegmenter, SegmentError, SentenceSegmenter};
pub use tokenize::{deaccent, tokenize};
