//! Inter-annotator agreement.
//!
//! - `cohen`: Cohen's kappa for two label sequences
//! - `fleiss`: Fleiss' kappa over a rater count matrix
//! - `annotations`: loading annotation exports and scoring them

pub mod annotations;
mod cohen;
mod fleiss;

use thiserror::Error;

pub use annotations::{
    count_matrix, flatten_labels, pairwise_agreement, AgreementReport, AnnotationError,
    AnnotationSet, ItemAgreement,
};
pub use cohen::cohen_kappa;
pub use fleiss::{fleiss_kappa, RaterCountMatrix};

/// Errors for inputs on which an agreement coefficient cannot be computed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AgreementError {
    #[error("Label sequences differ in length: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("No items to score")]
    Empty,

    #[error("Count matrix row {row} has {found} categories, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Count matrix row {row} sums to {found} ratings, expected {expected}")]
    InconsistentRowSum { row: usize, expected: u64, found: u64 },

    #[error("At least two raters are required, found {0}")]
    TooFewRaters(u64),

    #[error("Kappa is undefined: expected agreement is 1")]
    Undefined,
}

/// Round to 4 decimal places.
pub(crate) fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
