//! Export command: one statement per line.

use std::io::Write;
use std::path::Path;

use urtica::config::Settings;
use urtica::pipeline::{read_statements, sample_statements};

use crate::cli::icons::{dim_arrow, success};

/// Write a seeded sample of statements as plain lines for annotation-tool import.
pub async fn cmd_export(
    settings: &Settings,
    input: Option<&Path>,
    output: Option<&Path>,
    limit: usize,
    seed: u64,
) -> anyhow::Result<()> {
    let input = input
        .map(Path::to_path_buf)
        .unwrap_or_else(|| settings.statements_path());
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| settings.lines_path());

    let records = read_statements(&input)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", input.display(), e))?;
    let sample = sample_statements(&records, limit, seed);
    tracing::debug!(
        "Sampled {} of {} statements with seed {}",
        sample.len(),
        records.len(),
        seed
    );

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::io::BufWriter::new(std::fs::File::create(&output)?);
    for record in &sample {
        writeln!(file, "{}", record.statement.replace(['\r', '\n'], " "))?;
    }
    file.flush()?;

    println!(
        "{} Exported {} of {} statements",
        success(),
        sample.len(),
        records.len()
    );
    println!("  {} Written to {}", dim_arrow(), output.display());

    Ok(())
}
