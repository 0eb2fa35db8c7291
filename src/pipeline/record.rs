//! Statement records and their CSV form.

use std::fs;
use std::path::Path;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::utils::csv::{write_record, CsvError, CsvTable};

/// Column names of the statements file, in order.
pub const STATEMENT_COLUMNS: [&str; 3] = ["article", "statement", "lemma"];

/// One kept statement and its lemmatized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementRecord {
    pub article: String,
    pub statement: String,
    pub lemma: String,
}

/// Write records as `article,statement,lemma` CSV, creating parent directories.
pub fn write_statements(path: &Path, records: &[StatementRecord]) -> Result<(), CsvError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut out = Vec::new();
    write_record(&mut out, &STATEMENT_COLUMNS)?;
    for record in records {
        write_record(
            &mut out,
            &[
                record.article.as_str(),
                record.statement.as_str(),
                record.lemma.as_str(),
            ],
        )?;
    }
    fs::write(path, out)?;
    Ok(())
}

/// Read a statements file written by `write_statements`.
pub fn read_statements(path: &Path) -> Result<Vec<StatementRecord>, CsvError> {
    let table = CsvTable::read(path)?;
    let articles = table.values("article")?;
    let statements = table.values("statement")?;
    let lemmas = table.values("lemma")?;

    Ok(articles
        .zip(statements)
        .zip(lemmas)
        .map(|((article, statement), lemma)| StatementRecord {
            article: article.to_string(),
            statement: statement.to_string(),
            lemma: lemma.to_string(),
        })
        .collect())
}

/// Seed used for annotation samples unless another is given.
pub const DEFAULT_SAMPLE_SEED: u64 = 2;

/// Pick `size` records at random with a seeded generator.
///
/// The same seed always yields the same records in the same order. A size of
/// zero, or one covering every record, returns all records in file order.
pub fn sample_statements(
    records: &[StatementRecord],
    size: usize,
    seed: u64,
) -> Vec<&StatementRecord> {
    if size == 0 || size >= records.len() {
        return records.iter().collect();
    }
    let mut rng = StdRng::seed_from_u64(seed);
    records.choose_multiple(&mut rng, size).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_and_read_statements() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("ProcessedData.csv");
        let records = vec![StatementRecord {
            article: "Smith, 2019".to_string(),
            statement: "Wheals resolved within 24 hours, \"mostly\".".to_string(),
            lemma: "wheal resolve within hour mostly".to_string(),
        }];

        write_statements(&path, &records).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("article,statement,lemma\n"));
        assert_eq!(read_statements(&path).unwrap(), records);
    }

    fn numbered(count: usize) -> Vec<StatementRecord> {
        (0..count)
            .map(|i| StatementRecord {
                article: format!("doc{}", i),
                statement: format!("Statement {}.", i),
                lemma: String::new(),
            })
            .collect()
    }

    #[test]
    fn test_sample_is_deterministic_for_seed() {
        let records = numbered(50);
        let first = sample_statements(&records, 10, DEFAULT_SAMPLE_SEED);
        let again = sample_statements(&records, 10, DEFAULT_SAMPLE_SEED);
        assert_eq!(first.len(), 10);
        assert_eq!(first, again);

        let mut distinct: Vec<&str> = first.iter().map(|r| r.article.as_str()).collect();
        distinct.sort();
        distinct.dedup();
        assert_eq!(distinct.len(), 10);

        let other = sample_statements(&records, 10, 7);
        assert_ne!(first, other);
    }

    #[test]
    fn test_sample_covering_everything_keeps_order() {
        let records = numbered(3);
        let all: Vec<&StatementRecord> = records.iter().collect();
        assert_eq!(sample_statements(&records, 0, 2), all);
        assert_eq!(sample_statements(&records, 3, 2), all);
        assert_eq!(sample_statements(&records, 9000, 2), all);
    }

    #[test]
    fn test_read_requires_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "article,text\na,b\n").unwrap();
        assert!(matches!(
            read_statements(&path),
            Err(CsvError::MissingColumn(column)) if column == "statement"
        ));
    }
}
