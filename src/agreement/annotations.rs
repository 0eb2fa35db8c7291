//! Annotation exports and agreement reports.
//!
//! Each annotator's work is exported as JSON lines, one object per item:
//!
//! ```json
//! {"id": 17, "data": "Patients with chronic urticaria ...", "label": [[14, 33, "DISEASE"]]}
//! ```
//!
//! Label spans are flattened to strings (`"14 33 DISEASE"`) so that two
//! annotators agree on a span only when offsets and tag all match.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::{cohen_kappa, AgreementError, RaterCountMatrix};

/// Category used for items an annotator left unlabelled.
const UNLABELLED: &str = "none";

#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Line {line}: id must be a string or a number")]
    InvalidId { line: usize },
}

#[derive(Debug, Deserialize)]
struct AnnotationLine {
    id: Value,
    #[serde(default, alias = "labels")]
    label: Vec<Vec<Value>>,
}

/// Flatten label spans into comparable strings.
pub fn flatten_labels(spans: &[Vec<Value>]) -> Vec<String> {
    spans
        .iter()
        .map(|span| {
            span.iter()
                .map(|part| match part {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

/// One annotator's labels, keyed by item id.
#[derive(Debug, Clone, Default)]
pub struct AnnotationSet {
    name: String,
    items: BTreeMap<String, Vec<String>>,
}

impl AnnotationSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: BTreeMap::new(),
        }
    }

    /// Parse a JSON-lines export. Blank lines are skipped.
    pub fn from_jsonl(name: impl Into<String>, content: &str) -> Result<Self, AnnotationError> {
        let mut set = Self::new(name);

        for (index, raw) in content.lines().enumerate() {
            let line = index + 1;
            if raw.trim().is_empty() {
                continue;
            }
            let parsed: AnnotationLine = serde_json::from_str(raw)
                .map_err(|source| AnnotationError::Parse { line, source })?;
            let id = match parsed.id {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                _ => return Err(AnnotationError::InvalidId { line }),
            };
            set.insert(id, flatten_labels(&parsed.label));
        }

        Ok(set)
    }

    /// Load an export file; the annotator is named after the file stem.
    pub fn load(path: &Path) -> Result<Self, AnnotationError> {
        let content = std::fs::read_to_string(path)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let set = Self::from_jsonl(name, &content)?;
        tracing::debug!("Loaded {} annotated items from {}", set.len(), path.display());
        Ok(set)
    }

    pub fn insert(&mut self, id: impl Into<String>, labels: Vec<String>) {
        self.items.insert(id.into(), labels);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, id: &str) -> Option<&[String]> {
        self.items.get(id).map(Vec::as_slice)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Single category for an item: its labels sorted and joined with `|`.
    fn category(&self, id: &str) -> Option<String> {
        self.items.get(id).map(|labels| {
            if labels.is_empty() {
                return UNLABELLED.to_string();
            }
            let mut sorted = labels.clone();
            sorted.sort();
            sorted.join("|")
        })
    }
}

/// Agreement on a single item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemAgreement {
    pub id: String,
    pub kappa: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Per-item Cohen's kappa between two annotators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgreementReport {
    pub first: String,
    pub second: String,
    pub items: Vec<ItemAgreement>,
    /// Mean kappa over items where it is defined.
    pub mean: Option<f64>,
}

impl AgreementReport {
    pub fn scored(&self) -> usize {
        self.items.iter().filter(|i| i.kappa.is_some()).count()
    }
}

/// Score every item both annotators labelled, in id order.
///
/// Items whose kappa cannot be computed (different span counts, no spans at
/// all) are kept in the report with their error and left out of the mean.
pub fn pairwise_agreement(first: &AnnotationSet, second: &AnnotationSet) -> AgreementReport {
    let mut items = Vec::new();

    for (id, left) in &first.items {
        let Some(right) = second.items.get(id) else {
            continue;
        };
        let item = match cohen_kappa(left, right) {
            Ok(kappa) => ItemAgreement {
                id: id.clone(),
                kappa: Some(kappa),
                error: None,
            },
            Err(e) => {
                tracing::debug!("Item {} not scored: {}", id, e);
                ItemAgreement {
                    id: id.clone(),
                    kappa: None,
                    error: Some(e.to_string()),
                }
            }
        };
        items.push(item);
    }

    let scores: Vec<f64> = items.iter().filter_map(|i| i.kappa).collect();
    let mean = if scores.is_empty() {
        None
    } else {
        Some(scores.iter().sum::<f64>() / scores.len() as f64)
    };

    AgreementReport {
        first: first.name.clone(),
        second: second.name.clone(),
        items,
        mean,
    }
}

/// Build a Fleiss count matrix over the items every annotator labelled.
///
/// Returns the matrix, the category names (column order) and the item ids
/// (row order).
pub fn count_matrix(
    sets: &[AnnotationSet],
) -> Result<(RaterCountMatrix, Vec<String>, Vec<String>), AgreementError> {
    let Some((head, rest)) = sets.split_first() else {
        return Err(AgreementError::Empty);
    };

    let shared: BTreeSet<&str> = head
        .ids()
        .filter(|id| rest.iter().all(|set| set.items.contains_key(*id)))
        .collect();

    let ratings: Vec<Vec<String>> = shared
        .iter()
        .map(|id| sets.iter().filter_map(|set| set.category(id)).collect())
        .collect();

    let (matrix, categories) = RaterCountMatrix::from_ratings(&ratings)?;
    let ids = shared.into_iter().map(str::to_string).collect();
    Ok((matrix, categories, ids))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agreement::fleiss_kappa;

    const ADMIN: &str = r#"{"id": 1, "data": "a", "label": [[0, 5, "DISEASE"]]}
{"id": 2, "data": "b", "label": [[0, 4, "DRUG"], [10, 14, "DISEASE"]]}
{"id": 3, "data": "c", "label": []}

{"id": "x4", "data": "d", "label": [[2, 3, "DRUG"]]}
"#;

    const REVIEWER: &str = r#"{"id": 1, "text": "a", "label": [[0, 5, "DISEASE"]]}
{"id": 2, "text": "b", "label": [[0, 4, "DRUG"], [10, 14, "SYMPTOM"]]}
{"id": 3, "text": "c", "label": []}
{"id": 5, "text": "e", "label": [[1, 2, "DRUG"]]}
"#;

    #[test]
    fn test_flatten_labels() {
        let spans = vec![vec![Value::from(0), Value::from(5), Value::from("DISEASE")]];
        assert_eq!(flatten_labels(&spans), vec!["0 5 DISEASE".to_string()]);
    }

    #[test]
    fn test_from_jsonl() {
        let set = AnnotationSet::from_jsonl("admin", ADMIN).unwrap();
        assert_eq!(set.len(), 4);
        assert_eq!(set.name(), "admin");
        assert_eq!(
            set.get("2").unwrap(),
            &["0 4 DRUG".to_string(), "10 14 DISEASE".to_string()]
        );
        assert!(set.get("3").unwrap().is_empty());
        assert!(set.get("x4").is_some());
    }

    #[test]
    fn test_from_jsonl_reports_line() {
        let err = AnnotationSet::from_jsonl("bad", "{\"id\": 1}\nnot json").unwrap_err();
        assert!(matches!(err, AnnotationError::Parse { line: 2, .. }));

        let err = AnnotationSet::from_jsonl("bad", "{\"id\": [1]}").unwrap_err();
        assert!(matches!(err, AnnotationError::InvalidId { line: 1 }));
    }

    #[test]
    fn test_pairwise_agreement() {
        let admin = AnnotationSet::from_jsonl("admin", ADMIN).unwrap();
        let reviewer = AnnotationSet::from_jsonl("reviewer", REVIEWER).unwrap();
        let report = pairwise_agreement(&admin, &reviewer);

        let ids: Vec<&str> = report.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);

        // Item 1: identical single span
        assert_eq!(report.items[0].kappa, Some(1.0));
        // Item 2: one of two spans matches, A = 0.5, E = 0.25
        assert_eq!(report.items[1].kappa, Some(0.3333));
        // Item 3: nothing to compare
        assert_eq!(report.items[2].kappa, None);
        assert!(report.items[2].error.is_some());

        assert_eq!(report.scored(), 2);
        let mean = report.mean.unwrap();
        assert!((mean - (1.0 + 0.3333) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_count_matrix() {
        let mut a = AnnotationSet::new("a");
        let mut b = AnnotationSet::new("b");
        let mut c = AnnotationSet::new("c");
        a.insert("1", vec!["DRUG".to_string()]);
        b.insert("1", vec!["DRUG".to_string()]);
        c.insert("1", vec!["DRUG".to_string()]);
        a.insert("2", vec![]);
        b.insert("2", vec![]);
        c.insert("2", vec![]);
        a.insert("3", vec!["DRUG".to_string()]);

        let (matrix, categories, ids) = count_matrix(&[a, b, c]).unwrap();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(categories, vec!["DRUG", "none"]);
        assert_eq!(matrix.rows().to_vec(), vec![vec![3, 0], vec![0, 3]]);
        assert_eq!(fleiss_kappa(&matrix), Ok(1.0));
    }

    #[test]
    fn test_count_matrix_requires_sets() {
        assert_eq!(count_matrix(&[]).unwrap_err(), AgreementError::Empty);
    }
}
