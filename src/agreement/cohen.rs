//! Cohen's kappa for a pair of annotators.

use std::collections::HashMap;
use std::hash::Hash;

use super::{round4, AgreementError};

/// Cohen's kappa between two label sequences over the same items.
///
/// Position `i` in both sequences must refer to the same item. Observed
/// agreement is the share of matching positions; expected agreement sums,
/// over every label, the product of its frequency in each sequence.
///
/// Two identical constant sequences have both agreements equal to 1 and score
/// exactly 1. Any other input with expected agreement 1 is `Undefined`.
pub fn cohen_kappa<T>(first: &[T], second: &[T]) -> Result<f64, AgreementError>
where
    T: Eq + Hash,
{
    if first.len() != second.len() {
        return Err(AgreementError::LengthMismatch {
            left: first.len(),
            right: second.len(),
        });
    }
    if first.is_empty() {
        return Err(AgreementError::Empty);
    }

    let n = first.len() as u64;
    let matches = first.iter().zip(second).filter(|(a, b)| a == b).count() as u64;

    let mut counts: HashMap<&T, (u64, u64)> = HashMap::new();
    for label in first {
        counts.entry(label).or_default().0 += 1;
    }
    for label in second {
        counts.entry(label).or_default().1 += 1;
    }
    // Integer sum keeps the result independent of map iteration order
    let chance_pairs: u64 = counts.values().map(|&(a, b)| a * b).sum();

    let total_pairs = n * n;
    if chance_pairs == total_pairs {
        return if matches == n {
            Ok(1.0)
        } else {
            Err(AgreementError::Undefined)
        };
    }

    let observed = matches as f64 / n as f64;
    let expected = chance_pairs as f64 / total_pairs as f64;
    Ok(round4((observed - expected) / (1.0 - expected)))
}
