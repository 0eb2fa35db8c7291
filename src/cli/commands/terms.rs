//! Terms command.

use std::path::Path;

use urtica::config::Settings;
use urtica::pipeline::read_statements;
use urtica::terms::{term_frequencies, StopWords};

use crate::cli::icons::{info, warn};

/// Print the most frequent lemma terms.
pub async fn cmd_terms(
    settings: &Settings,
    input: Option<&Path>,
    top: usize,
    json: bool,
) -> anyhow::Result<()> {
    let input = input
        .map(Path::to_path_buf)
        .unwrap_or_else(|| settings.statements_path());
    if !input.exists() {
        anyhow::bail!(
            "Statements not found: {} (run `urtica process` first)",
            input.display()
        );
    }

    let records = read_statements(&input)?;
    let mut stop_words = StopWords::from_config(&settings.terms);
    if settings.terms.exclude_article_names {
        stop_words = stop_words.with_article_names(records.iter().map(|r| r.article.as_str()));
    }
    tracing::debug!("Using {} stop words", stop_words.len());

    let limit = match top {
        0 => settings.terms.max_terms,
        n => n.min(settings.terms.max_terms),
    };
    let terms = term_frequencies(records.iter().map(|r| r.lemma.as_str()), &stop_words, limit);

    if json {
        println!("{}", serde_json::to_string_pretty(&terms)?);
        return Ok(());
    }

    if terms.is_empty() {
        println!("{} No terms left after stop word removal", warn());
        return Ok(());
    }

    println!(
        "{} Top {} terms in {} statements",
        info(),
        terms.len(),
        records.len()
    );
    for term in &terms {
        println!("  {:>8}  {}", term.count, term.term);
    }

    Ok(())
}
