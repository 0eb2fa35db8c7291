//! Agreement commands.

use std::path::{Path, PathBuf};

use console::style;

use urtica::agreement::{count_matrix, fleiss_kappa, pairwise_agreement, AnnotationSet};

use crate::cli::icons::{dim_arrow, error, info, success, warn};

fn load_set(path: &Path) -> anyhow::Result<AnnotationSet> {
    AnnotationSet::load(path)
        .map_err(|e| anyhow::anyhow!("Failed to load {}: {}", path.display(), e))
}

/// Per-item Cohen's kappa between two annotators.
pub async fn cmd_cohen(first: &Path, second: &Path, json: bool) -> anyhow::Result<()> {
    let first = load_set(first)?;
    let second = load_set(second)?;
    let report = pairwise_agreement(&first, &second);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.items.is_empty() {
        println!(
            "{} {} and {} have no items in common",
            warn(),
            report.first,
            report.second
        );
        return Ok(());
    }

    println!(
        "{} Cohen's kappa: {} vs {}",
        info(),
        style(&report.first).bold(),
        style(&report.second).bold()
    );
    for item in &report.items {
        match (item.kappa, &item.error) {
            (Some(kappa), _) => println!("  {:>10}  {:.4}", item.id, kappa),
            (None, Some(e)) => println!("  {:>10}  {} {}", item.id, error(), style(e).dim()),
            (None, None) => println!("  {:>10}  -", item.id),
        }
    }

    match report.mean {
        Some(mean) => println!(
            "{} Mean kappa {:.4} over {} of {} items",
            success(),
            mean,
            report.scored(),
            report.items.len()
        ),
        None => println!("{} No item could be scored", warn()),
    }

    Ok(())
}

/// Fleiss' kappa across any number of annotators.
pub async fn cmd_fleiss(files: &[PathBuf], json: bool) -> anyhow::Result<()> {
    let sets = files
        .iter()
        .map(|path| load_set(path))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let (matrix, categories, ids) = count_matrix(&sets)?;
    let kappa = fleiss_kappa(&matrix)?;

    if json {
        let value = serde_json::json!({
            "annotators": sets.iter().map(AnnotationSet::name).collect::<Vec<_>>(),
            "items": ids.len(),
            "categories": categories,
            "kappa": kappa,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!(
        "{} Fleiss' kappa over {} annotators",
        info(),
        matrix.raters()
    );
    println!("  {} {} shared items", dim_arrow(), ids.len());
    println!("  {} {} categories", dim_arrow(), categories.len());
    println!("{} Kappa {:.4}", success(), kappa);

    Ok(())
}
