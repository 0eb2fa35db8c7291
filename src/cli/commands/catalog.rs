//! Catalog command.

use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use urtica::catalog::Catalog;
use urtica::config::Settings;

use crate::cli::icons::{dim_arrow, success, warn};

/// Scan `root` for documents and write the deduplicated catalog.
pub async fn cmd_catalog(
    settings: &Settings,
    root: &Path,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    if !root.is_dir() {
        anyhow::bail!("Not a directory: {}", root.display());
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(format!("Scanning {}...", root.display()));
    pb.enable_steady_tick(Duration::from_millis(100));

    let config = settings.catalog.clone();
    let scan_root = root.to_path_buf();
    let catalog =
        tokio::task::spawn_blocking(move || Catalog::build(&scan_root, &config)).await??;
    pb.finish_and_clear();

    if catalog.is_empty() {
        println!(
            "{} No .{} files found under {}",
            warn(),
            settings.catalog.extension,
            root.display()
        );
        return Ok(());
    }

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| settings.catalog_path());
    catalog.write_csv(&output)?;

    println!(
        "{} Cataloged {} documents",
        success(),
        catalog.summary.unique
    );
    println!(
        "  {} {} files scanned, {} duplicates dropped",
        dim_arrow(),
        catalog.summary.total,
        catalog.summary.duplicates()
    );
    println!("  {} Written to {}", dim_arrow(), output.display());

    Ok(())
}
