//! Process command: statements from cataloged documents.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};

use urtica::catalog::Catalog;
use urtica::config::Settings;
use urtica::extract::{AutoExtractor, PdfToTextExtractor};
use urtica::pipeline::{write_statements, Pipeline};

use crate::cli::icons::{dim_arrow, info, success, warn};

/// Command-line overrides for a processing run.
pub struct ProcessOptions {
    pub catalog: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub workers: Option<usize>,
    pub min_length: Option<usize>,
    pub skip_headers: bool,
}

/// Run the statement pipeline over a catalog and write the statements CSV.
pub async fn cmd_process(settings: &Settings, options: ProcessOptions) -> anyhow::Result<()> {
    let catalog_path = options.catalog.unwrap_or_else(|| settings.catalog_path());
    if !catalog_path.exists() {
        anyhow::bail!(
            "Catalog not found: {} (run `urtica catalog <dir>` first)",
            catalog_path.display()
        );
    }

    let catalog = Catalog::read_csv(&catalog_path)?;
    if catalog.is_empty() {
        println!("{} Catalog {} is empty", warn(), catalog_path.display());
        return Ok(());
    }

    let mut pipeline_config = settings.pipeline.clone();
    if let Some(workers) = options.workers {
        pipeline_config.workers = workers;
    }
    if let Some(min_length) = options.min_length {
        pipeline_config.min_statement_length = min_length;
    }
    let mut normalizer = settings.normalizer.clone();
    normalizer.skip_headers |= options.skip_headers;

    let pdftotext = PdfToTextExtractor::from_config(&settings.extraction);
    if !pdftotext.is_available() {
        println!("{} {}", warn(), missing_tool_warning(pdftotext.binary()));
    }

    println!(
        "{} Processing {} documents with {} workers",
        info(),
        catalog.entries.len(),
        pipeline_config.workers
    );

    let pb = ProgressBar::new(catalog.entries.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    let progress = pb.clone();

    let pipeline = Pipeline::new(
        pipeline_config,
        normalizer,
        Arc::new(AutoExtractor::new(&settings.extraction)),
    )
    .with_progress(move |article| {
        progress.set_message(article.to_string());
        progress.inc(1);
    });

    let output = pipeline.run(&catalog.entries).await?;
    pb.finish_and_clear();

    let output_path = options
        .output
        .unwrap_or_else(|| settings.statements_path());
    write_statements(&output_path, &output.records)?;

    let report = output.report;
    println!(
        "{} Kept {} statements from {} documents",
        success(),
        report.statements,
        report.documents
    );
    if report.skipped > 0 {
        println!("  {} {} documents had no text", warn(), report.skipped);
    }
    if report.failed > 0 {
        println!(
            "  {} {} documents failed (see warnings above)",
            warn(),
            report.failed
        );
    }
    println!("  {} Written to {}", dim_arrow(), output_path.display());

    Ok(())
}

/// Shown when the PDF tool is missing. PDFs are attempted anyway and counted as failed.
fn missing_tool_warning(binary: &Path) -> String {
    format!(
        "{} not found in PATH; PDF documents will fail to extract",
        binary.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tool_warning_reports_failure() {
        let message = missing_tool_warning(Path::new("pdftotext"));
        assert!(message.starts_with("pdftotext not found"));
        assert!(message.contains("will fail"));
        assert!(!message.contains("skipped"));
    }
}
