//! Batch statement extraction.
//!
//! Cataloged documents are split into contiguous partitions, one per worker.
//! Each worker builds its own segmenter and morphology once and runs
//! extract, clean, segment, filter and lemmatize over every document in its
//! partition. A document that fails is logged and skipped; the batch carries on.

mod batch;
pub mod record;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use batch::{partition, Pipeline, PipelineOutput, WorkerComponents};
pub use record::{
    read_statements, sample_statements, write_statements, StatementRecord, DEFAULT_SAMPLE_SEED,
    STATEMENT_COLUMNS,
};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("At least one worker is required")]
    NoWorkers,

    #[error("Worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Pipeline settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Number of partitions processed in parallel.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Statements must be strictly longer than this many characters.
    #[serde(default = "default_min_statement_length")]
    pub min_statement_length: usize,
}

fn default_workers() -> usize {
    8
}

fn default_min_statement_length() -> usize {
    100
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            min_statement_length: default_min_statement_length(),
        }
    }
}

/// Counts collected over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    /// Documents that produced text.
    pub documents: usize,
    /// Documents with no extractable text.
    pub skipped: usize,
    /// Documents whose extraction or segmentation failed.
    pub failed: usize,
    /// Statements kept after the length filter.
    pub statements: usize,
}

impl PipelineReport {
    /// Merge counts from another worker.
    pub fn merge(&mut self, other: &PipelineReport) {
        self.documents += other.documents;
        self.skipped += other.skipped;
        self.failed += other.failed;
        self.statements += other.statements;
    }
}
