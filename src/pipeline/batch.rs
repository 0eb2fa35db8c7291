//! Partitioned workers over cataloged documents.

use std::sync::Arc;

use thiserror::Error;

use super::{PipelineConfig, PipelineError, PipelineReport, StatementRecord};
use crate::catalog::CatalogEntry;
use crate::extract::{DocumentExtractor, ExtractionError};
use crate::text::{
    lemmatize, Morphology, Normalizer, NormalizerConfig, RuleLemmatizer, RuleSegmenter,
    SegmentError, SentenceSegmenter,
};

/// Language components owned by a single worker.
pub struct WorkerComponents {
    pub segmenter: Box<dyn SentenceSegmenter>,
    pub morphology: Box<dyn Morphology>,
}

impl WorkerComponents {
    /// The built-in rule-based segmenter and lemmatizer.
    pub fn rule_based() -> Self {
        Self {
            segmenter: Box::new(RuleSegmenter::new()),
            morphology: Box::new(RuleLemmatizer::new()),
        }
    }
}

type ComponentFactory = Arc<dyn Fn() -> WorkerComponents + Send + Sync>;
type ProgressHook = Arc<dyn Fn(&str) + Send + Sync>;

/// Records and counts from a completed run.
#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    pub records: Vec<StatementRecord>,
    pub report: PipelineReport,
}

/// Why a single document was dropped.
#[derive(Debug, Error)]
enum DocumentError {
    #[error("{0}")]
    Extraction(#[from] ExtractionError),

    #[error("{0}")]
    Segmentation(#[from] SegmentError),
}

/// Split `items` into at most `parts` contiguous partitions of near-equal size.
///
/// Earlier partitions take the remainder, so sizes never differ by more than
/// one. Empty partitions are not produced.
pub fn partition<T: Clone>(items: &[T], parts: usize) -> Vec<Vec<T>> {
    if items.is_empty() || parts == 0 {
        return Vec::new();
    }

    let parts = parts.min(items.len());
    let base = items.len() / parts;
    let extra = items.len() % parts;

    let mut partitions = Vec::with_capacity(parts);
    let mut start = 0;
    for index in 0..parts {
        let size = base + usize::from(index < extra);
        partitions.push(items[start..start + size].to_vec());
        start += size;
    }
    partitions
}

/// Statement extraction over a batch of documents.
#[derive(Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    normalizer: Normalizer,
    extractor: Arc<dyn DocumentExtractor>,
    factory: ComponentFactory,
    progress: Option<ProgressHook>,
}

impl Pipeline {
    /// Create a pipeline using the rule-based language components.
    pub fn new(
        config: PipelineConfig,
        normalizer: NormalizerConfig,
        extractor: Arc<dyn DocumentExtractor>,
    ) -> Self {
        Self {
            config,
            normalizer: Normalizer::new(normalizer),
            extractor,
            factory: Arc::new(WorkerComponents::rule_based),
            progress: None,
        }
    }

    /// Use a different component factory. It is called once per worker.
    pub fn with_components<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> WorkerComponents + Send + Sync + 'static,
    {
        self.factory = Arc::new(factory);
        self
    }

    /// Call `hook` with the article name after each document.
    pub fn with_progress<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.progress = Some(Arc::new(hook));
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Process every entry. Records come back in partition order, then
    /// document order, then sentence order.
    pub async fn run(&self, entries: &[CatalogEntry]) -> Result<PipelineOutput, PipelineError> {
        if self.config.workers == 0 {
            return Err(PipelineError::NoWorkers);
        }

        let partitions = partition(entries, self.config.workers);
        tracing::info!(
            "Processing {} documents in {} partitions",
            entries.len(),
            partitions.len()
        );

        let mut handles = Vec::with_capacity(partitions.len());
        for (index, documents) in partitions.into_iter().enumerate() {
            let worker = Worker {
                index,
                normalizer: self.normalizer.clone(),
                extractor: Arc::clone(&self.extractor),
                factory: Arc::clone(&self.factory),
                progress: self.progress.clone(),
                min_statement_length: self.config.min_statement_length,
            };
            handles.push(tokio::task::spawn_blocking(move || worker.run(documents)));
        }

        let mut output = PipelineOutput::default();
        for handle in handles {
            let (records, report) = handle.await?;
            output.records.extend(records);
            output.report.merge(&report);
        }

        tracing::info!(
            "Kept {} statements from {} documents ({} empty, {} failed)",
            output.report.statements,
            output.report.documents,
            output.report.skipped,
            output.report.failed
        );
        Ok(output)
    }
}

struct Worker {
    index: usize,
    normalizer: Normalizer,
    extractor: Arc<dyn DocumentExtractor>,
    factory: ComponentFactory,
    progress: Option<ProgressHook>,
    min_statement_length: usize,
}

impl Worker {
    fn run(self, documents: Vec<CatalogEntry>) -> (Vec<StatementRecord>, PipelineReport) {
        let components = (self.factory)();
        tracing::debug!("Worker {} started with {} documents", self.index, documents.len());

        let mut records = Vec::new();
        let mut report = PipelineReport::default();

        for entry in &documents {
            match self.process(entry, &components) {
                Ok(Some(kept)) => {
                    tracing::debug!("{}: kept {} statements", entry.name, kept.len());
                    report.documents += 1;
                    report.statements += kept.len();
                    records.extend(kept);
                }
                Ok(None) => {
                    tracing::warn!("No text extracted from {}", entry.path.display());
                    report.skipped += 1;
                }
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", entry.path.display(), e);
                    report.failed += 1;
                }
            }
            if let Some(progress) = &self.progress {
                progress(&entry.name);
            }
        }

        (records, report)
    }

    /// Statements kept for one document, or `None` when it has no text.
    fn process(
        &self,
        entry: &CatalogEntry,
        components: &WorkerComponents,
    ) -> Result<Option<Vec<StatementRecord>>, DocumentError> {
        let text = self.extractor.extract(&entry.path)?;
        if text.trim().is_empty() {
            return Ok(None);
        }

        let statements = self
            .normalizer
            .extract_statements(&text, components.segmenter.as_ref())?;

        let kept = statements
            .into_iter()
            .filter(|s| s.chars().count() > self.min_statement_length)
            .map(|statement| StatementRecord {
                article: entry.name.clone(),
                lemma: lemmatize(components.morphology.as_ref(), &statement),
                statement,
            })
            .collect();
        Ok(Some(kept))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::extract::PlainTextExtractor;

    const LONG: &str = "Chronic spontaneous urticaria is characterised by itchy wheals, \
                        angioedema or both that persist for more than six weeks.";

    fn entry(path: PathBuf) -> CatalogEntry {
        CatalogEntry {
            name: path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default(),
            path,
            checksum: String::new(),
        }
    }

    fn write(dir: &Path, name: &str, content: &str) -> CatalogEntry {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        entry(path)
    }

    fn pipeline(workers: usize) -> Pipeline {
        Pipeline::new(
            PipelineConfig {
                workers,
                ..PipelineConfig::default()
            },
            NormalizerConfig::default(),
            Arc::new(PlainTextExtractor),
        )
    }

    #[test]
    fn test_partition_sizes() {
        let items: Vec<u32> = (0..10).collect();
        let parts = partition(&items, 4);
        let sizes: Vec<usize> = parts.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![3, 3, 2, 2]);
        assert_eq!(parts.concat(), items);

        assert_eq!(partition(&items[..2], 8).len(), 2);
        assert!(partition::<u32>(&[], 8).is_empty());
    }

    #[tokio::test]
    async fn test_filters_short_statements() {
        let dir = tempfile::tempdir().unwrap();
        let doc = write(dir.path(), "smith", &format!("{} Hives itch.", LONG));

        let output = pipeline(2).run(&[doc]).await.unwrap();
        assert_eq!(output.records.len(), 1);
        let record = &output.records[0];
        assert_eq!(record.article, "smith");
        assert_eq!(record.statement, LONG);
        assert!(record.lemma.contains("urticaria"));
        assert_eq!(
            output.report,
            PipelineReport {
                documents: 1,
                skipped: 0,
                failed: 0,
                statements: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_failures_are_isolated_and_order_kept() {
        let dir = tempfile::tempdir().unwrap();
        let entries = vec![
            write(dir.path(), "a", LONG),
            entry(dir.path().join("missing.txt")),
            write(dir.path(), "empty", "  \n"),
            write(dir.path(), "b", LONG),
            write(dir.path(), "c", LONG),
        ];

        let output = pipeline(3).run(&entries).await.unwrap();
        let articles: Vec<&str> = output.records.iter().map(|r| r.article.as_str()).collect();
        assert_eq!(articles, vec!["a", "b", "c"]);
        assert_eq!(output.report.documents, 3);
        assert_eq!(output.report.skipped, 1);
        assert_eq!(output.report.failed, 1);
    }

    #[tokio::test]
    async fn test_components_built_once_per_worker() {
        let dir = tempfile::tempdir().unwrap();
        let entries: Vec<CatalogEntry> = (0..6)
            .map(|i| write(dir.path(), &format!("doc{}", i), LONG))
            .collect();

        let built = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&built);
        let seen = Arc::new(AtomicUsize::new(0));
        let progress = Arc::clone(&seen);

        let output = pipeline(2)
            .with_components(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                WorkerComponents::rule_based()
            })
            .with_progress(move |_| {
                progress.fetch_add(1, Ordering::SeqCst);
            })
            .run(&entries)
            .await
            .unwrap();

        assert_eq!(built.load(Ordering::SeqCst), 2);
        assert_eq!(seen.load(Ordering::SeqCst), 6);
        assert_eq!(output.report.statements, 6);
    }

    #[tokio::test]
    async fn test_segmenter_failure_skips_document() {
        struct Broken;
        impl SentenceSegmenter for Broken {
            fn segment(&self, _paragraph: &str) -> Result<Vec<String>, SegmentError> {
                Err(SegmentError::Unavailable("model not loaded".to_string()))
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let doc = write(dir.path(), "a", LONG);
        let output = pipeline(1)
            .with_components(|| WorkerComponents {
                segmenter: Box::new(Broken),
                morphology: Box::new(RuleLemmatizer::new()),
            })
            .run(&[doc])
            .await
            .unwrap();

        assert!(output.records.is_empty());
        assert_eq!(output.report.failed, 1);
    }

    #[tokio::test]
    async fn test_zero_workers() {
        let result = pipeline(0).run(&[]).await;
        assert!(matches!(result, Err(PipelineError::NoWorkers)));
    }
}
