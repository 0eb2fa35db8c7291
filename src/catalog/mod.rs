//! Document catalog: find article files, checksum them and drop duplicates.
//!
//! The same article is often downloaded more than once under different names.
//! Content checksums identify the copies so each article is processed once.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::utils::csv::{write_record, CsvError, CsvTable};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Catalog file error: {0}")]
    Csv(#[from] CsvError),
}

/// Catalog settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// File extension of documents to collect (case-insensitive, no dot).
    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_extension() -> String {
    "pdf".to_string()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            extension: default_extension(),
        }
    }
}

/// One cataloged document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Article name: the file name up to its first dot.
    pub name: String,
    pub path: PathBuf,
    /// Hex SHA-256 of the file content.
    pub checksum: String,
}

impl CatalogEntry {
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        Ok(Self {
            name: document_name(path),
            path: path.to_path_buf(),
            checksum: checksum(path)?,
        })
    }
}

/// Counts reported after deduplication.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CatalogSummary {
    pub total: usize,
    pub unique: usize,
}

impl CatalogSummary {
    pub fn duplicates(&self) -> usize {
        self.total - self.unique
    }
}

/// Article name for a path: the file name up to its first dot.
pub fn document_name(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    file_name.split('.').next().unwrap_or_default().to_string()
}

/// Compute SHA-256 of a file's content.
pub fn checksum(path: &Path) -> Result<String, CatalogError> {
    let content = fs::read(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut hasher = Sha256::new();
    hasher.update(&content);
    Ok(hex::encode(hasher.finalize()))
}

/// Recursively collect files with the given extension, sorted by path.
///
/// Symlinked directories are not descended into; symlinked files are kept.
pub fn scan(root: &Path, extension: &str) -> Result<Vec<PathBuf>, CatalogError> {
    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = fs::read_dir(&dir).map_err(|source| CatalogError::Io {
            path: dir.clone(),
            source,
        })?;
        for entry in entries {
            let entry = entry.map_err(|source| CatalogError::Io {
                path: dir.clone(),
                source,
            })?;
            let path = entry.path();
            let file_type = entry.file_type().map_err(|source| CatalogError::Io {
                path: path.clone(),
                source,
            })?;
            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_symlink() && path.is_dir() {
                tracing::debug!("Not following directory link {}", path.display());
            } else if path
                .extension()
                .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
            {
                found.push(path);
            }
        }
    }

    found.sort();
    Ok(found)
}

/// Keep the first entry for each checksum, preserving order.
pub fn dedup(entries: Vec<CatalogEntry>) -> (Vec<CatalogEntry>, CatalogSummary) {
    let total = entries.len();
    let mut seen = HashSet::new();
    let unique: Vec<CatalogEntry> = entries
        .into_iter()
        .filter(|e| seen.insert(e.checksum.clone()))
        .collect();
    let summary = CatalogSummary {
        total,
        unique: unique.len(),
    };
    (unique, summary)
}

/// A deduplicated set of documents.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub entries: Vec<CatalogEntry>,
    pub summary: CatalogSummary,
}

impl Catalog {
    /// Scan `root`, checksum every matching file and drop duplicates.
    pub fn build(root: &Path, config: &CatalogConfig) -> Result<Self, CatalogError> {
        let paths = scan(root, &config.extension)?;
        tracing::info!("Found {} .{} files under {}", paths.len(), config.extension, root.display());

        let entries = paths
            .iter()
            .map(|p| CatalogEntry::from_path(p))
            .collect::<Result<Vec<_>, _>>()?;
        let (entries, summary) = dedup(entries);
        tracing::info!(
            "Cataloged {} unique documents ({} duplicates)",
            summary.unique,
            summary.duplicates()
        );

        Ok(Self { entries, summary })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn write_csv(&self, path: &Path) -> Result<(), CatalogError> {
        let io_err = |source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let mut out = Vec::new();
        write_record(&mut out, &["name", "path", "checksum"]).map_err(io_err)?;
        for entry in &self.entries {
            let path_str = entry.path.to_string_lossy();
            write_record(
                &mut out,
                &[entry.name.as_str(), path_str.as_ref(), entry.checksum.as_str()],
            )
            .map_err(io_err)?;
        }
        fs::write(path, out).map_err(io_err)
    }

    /// Load a catalog written by `write_csv`. Entries are taken as-is; the
    /// summary counts them all as unique.
    pub fn read_csv(path: &Path) -> Result<Self, CatalogError> {
        let table = CsvTable::read(path)?;
        let (name, file, sum) = (
            table.column("name")?,
            table.column("path")?,
            table.column("checksum")?,
        );
        let entries: Vec<CatalogEntry> = table
            .rows()
            .iter()
            .map(|row| CatalogEntry {
                name: cell(row, name),
                path: PathBuf::from(cell(row, file)),
                checksum: cell(row, sum),
            })
            .collect();
        let summary = CatalogSummary {
            total: entries.len(),
            unique: entries.len(),
        };
        Ok(Self { entries, summary })
    }
}

fn cell(row: &[String], index: usize) -> String {
    row.get(index).cloned().unwrap_or_default()
}
