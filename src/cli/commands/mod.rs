//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod agreement;
mod catalog;
mod config_cmd;
mod export;
mod process;
mod terms;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use urtica::config::{load_settings_with_options, LoadOptions};
use urtica::pipeline::DEFAULT_SAMPLE_SEED;

#[derive(Parser)]
#[command(name = "urtica")]
#[command(about = "Article corpus preprocessing and inter-annotator agreement")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Data directory (overrides config file and URTICA_DATA_DIR)
    #[arg(short, long, global = true)]
    data: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Find article files under a directory, checksum them and write a deduplicated catalog
    Catalog {
        /// Directory to scan recursively
        root: PathBuf,
        /// Output CSV (default: <data>/catalog.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Extract, clean, segment and lemmatize statements from cataloged documents
    Process {
        /// Catalog CSV to read (default: <data>/catalog.csv)
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Output CSV (default: <data>/statements.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Number of parallel workers (default from config: 8)
        #[arg(short, long)]
        workers: Option<usize>,
        /// Keep statements longer than this many characters (default from config: 100)
        #[arg(long)]
        min_length: Option<usize>,
        /// Drop all-uppercase header lines before rebuilding paragraphs
        #[arg(long)]
        skip_headers: bool,
    },

    /// Inter-annotator agreement on annotation exports
    Agreement {
        #[command(subcommand)]
        command: AgreementCommands,
    },

    /// Show the most frequent terms in lemmatized statements
    Terms {
        /// Statements CSV (default: <data>/statements.csv)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Number of terms to show (0 = up to the configured maximum)
        #[arg(short = 'n', long, default_value = "50")]
        top: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write statements one per line for import into an annotation tool
    Export {
        /// Statements CSV (default: <data>/statements.csv)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Output text file (default: <data>/statements.txt)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Number of statements to sample (0 = all, in file order)
        #[arg(short, long, default_value = "9000")]
        limit: usize,
        /// Random seed for the sample
        #[arg(short, long, default_value_t = DEFAULT_SAMPLE_SEED)]
        seed: u64,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum AgreementCommands {
    /// Per-item Cohen's kappa between two annotators, and the mean
    Cohen {
        /// First annotator's JSONL export
        first: PathBuf,
        /// Second annotator's JSONL export
        second: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Fleiss' kappa over the items every annotator labelled
    Fleiss {
        /// One JSONL export per annotator
        #[arg(required = true, num_args = 2..)]
        files: Vec<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective settings as TOML
    Show,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        data: cli.data,
    };
    let (settings, config) = load_settings_with_options(options).await?;

    match cli.command {
        Commands::Catalog { root, output } => {
            catalog::cmd_catalog(&settings, &root, output.as_deref()).await
        }
        Commands::Process {
            catalog,
            output,
            workers,
            min_length,
            skip_headers,
        } => {
            process::cmd_process(
                &settings,
                process::ProcessOptions {
                    catalog,
                    output,
                    workers,
                    min_length,
                    skip_headers,
                },
            )
            .await
        }
        Commands::Agreement { command } => match command {
            AgreementCommands::Cohen {
                first,
                second,
                json,
            } => agreement::cmd_cohen(&first, &second, json).await,
            AgreementCommands::Fleiss { files, json } => {
                agreement::cmd_fleiss(&files, json).await
            }
        },
        Commands::Terms { input, top, json } => {
            terms::cmd_terms(&settings, input.as_deref(), top, json).await
        }
        Commands::Export {
            input,
            output,
            limit,
            seed,
        } => {
            export::cmd_export(&settings, input.as_deref(), output.as_deref(), limit, seed).await
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => config_cmd::cmd_config_show(&settings, &config).await,
        },
    }
}
