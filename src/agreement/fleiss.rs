//! Fleiss' kappa for any number of raters.

use std::collections::BTreeMap;

use super::{round4, AgreementError};

/// Items x categories table of rating counts.
///
/// Cell `(i, j)` is the number of raters who put item `i` in category `j`.
/// Every row sums to the same rater count; `new` rejects tables that don't.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaterCountMatrix {
    rows: Vec<Vec<u32>>,
    categories: usize,
    raters: u64,
}

impl RaterCountMatrix {
    pub fn new(rows: Vec<Vec<u32>>) -> Result<Self, AgreementError> {
        let categories = match rows.first() {
            Some(first) if !first.is_empty() => first.len(),
            _ => return Err(AgreementError::Empty),
        };
        let raters: u64 = rows[0].iter().map(|&c| u64::from(c)).sum();

        for (row, counts) in rows.iter().enumerate() {
            if counts.len() != categories {
                return Err(AgreementError::Ragged {
                    row,
                    expected: categories,
                    found: counts.len(),
                });
            }
            let found: u64 = counts.iter().map(|&c| u64::from(c)).sum();
            if found != raters {
                return Err(AgreementError::InconsistentRowSum {
                    row,
                    expected: raters,
                    found,
                });
            }
        }

        Ok(Self {
            rows,
            categories,
            raters,
        })
    }

    /// Build a matrix from per-item ratings, one label per rater.
    ///
    /// Categories are the distinct labels in sorted order; they are returned
    /// alongside the matrix so columns can be named.
    pub fn from_ratings<C>(ratings: &[Vec<C>]) -> Result<(Self, Vec<C>), AgreementError>
    where
        C: Ord + Clone,
    {
        let mut columns: BTreeMap<C, usize> = BTreeMap::new();
        for label in ratings.iter().flatten() {
            columns.entry(label.clone()).or_insert(0);
        }
        for (index, slot) in columns.values_mut().enumerate() {
            *slot = index;
        }

        let rows = ratings
            .iter()
            .map(|item| {
                let mut row = vec![0u32; columns.len()];
                for label in item {
                    row[columns[label]] += 1;
                }
                row
            })
            .collect();

        let matrix = Self::new(rows)?;
        Ok((matrix, columns.into_keys().collect()))
    }

    pub fn items(&self) -> usize {
        self.rows.len()
    }

    pub fn categories(&self) -> usize {
        self.categories
    }

    pub fn raters(&self) -> u64 {
        self.raters
    }

    pub fn rows(&self) -> &[Vec<u32>] {
        &self.rows
    }

    fn category_total(&self, category: usize) -> u64 {
        self.rows.iter().map(|row| u64::from(row[category])).sum()
    }
}

/// Fleiss' kappa for a rater count matrix.
///
/// Chance agreement is the sum of squared category shares; observed agreement
/// is the mean over items of the share of agreeing rater pairs.
pub fn fleiss_kappa(matrix: &RaterCountMatrix) -> Result<f64, AgreementError> {
    if matrix.raters() <= 1 {
        return Err(AgreementError::TooFewRaters(matrix.raters()));
    }

    let items = matrix.items() as f64;
    let raters = matrix.raters() as f64;
    let total = items * raters;

    let chance: f64 = (0..matrix.categories())
        .map(|j| {
            let share = matrix.category_total(j) as f64 / total;
            share * share
        })
        .sum();

    if chance >= 1.0 {
        return Err(AgreementError::Undefined);
    }

    let observed = matrix
        .rows()
        .iter()
        .map(|row| {
            let squares: u64 = row.iter().map(|&c| u64::from(c) * u64::from(c)).sum();
            (squares as f64 - raters) / (raters * (raters - 1.0))
        })
        .sum::<f64>()
        / items;

    Ok(round4((observed - chance) / (1.0 - chance)))
}
