//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod aggregate;
mod annotate;
mod dataset;
mod helpers;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_settings_with_options, LoadOptions};
use crate::services::AnnotationJob;

#[derive(Parser)]
#[command(name = "instanlp")]
#[command(about = "Entity and relation aggregation for scraped social-media accounts")]
#[command(version)]
pub struct Cli {
    /// Dataset directory (overrides DATASET_PATH and the config file)
    #[arg(long, short = 'd', global = true)]
    dataset: Option<PathBuf>,

    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// CoreNLP server endpoint (overrides CORENLP_URL and the config file)
    #[arg(long, global = true)]
    endpoint: Option<String>,

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
    /// Annotate account biographies (bio.json -> nlp.json)
    Bio {
        /// Number of accounts processed concurrently
        #[arg(short, long)]
        workers: Option<usize>,
        /// Re-annotate accounts that already have output
        #[arg(short, long)]
        force: bool,
    },

    /// Annotate post captions (info.json -> didascalia_nlp.json)
    Captions {
        /// Number of accounts processed concurrently
        #[arg(short, long)]
        workers: Option<usize>,
        /// Re-annotate accounts that already have output
        #[arg(short, long)]
        force: bool,
    },

    /// Aggregate a saved CoreNLP JSON response (no server needed)
    Aggregate {
        /// File containing the CoreNLP response
        file: PathBuf,
        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Annotate a single text and print the aggregated result
    AnnotateText {
        /// Text to annotate
        text: String,
        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Write account.txt listing accounts that have post metadata
    Scan,

    /// Convert numeric media ids to shortcodes
    Shortcode {
        /// Media ids or file names such as 2616109190035207246.jpg
        /// (default: every media file in the dataset)
        ids: Vec<String>,
    },

    /// Check that the CoreNLP server is reachable
    Status,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        dataset: cli.dataset,
    };
    let (mut settings, _config) = load_settings_with_options(options).await;

    if let Some(endpoint) = cli.endpoint {
        settings.corenlp = settings.corenlp.with_endpoint(&endpoint);
    }

    match cli.command {
        Commands::Bio { workers, force } => {
            annotate::cmd_annotate(&settings, AnnotationJob::Bio, workers, force).await
        }
        Commands::Captions { workers, force } => {
            annotate::cmd_annotate(&settings, AnnotationJob::Captions, workers, force).await
        }
        Commands::Aggregate { file, pretty } => aggregate::cmd_aggregate(&file, pretty).await,
        Commands::AnnotateText { text, pretty } => {
            aggregate::cmd_annotate_text(&settings, &text, pretty).await
        }
        Commands::Scan => dataset::cmd_scan(&settings).await,
        Commands::Shortcode { ids } => dataset::cmd_shortcode(&settings, &ids).await,
        Commands::Status => annotate::cmd_status(&settings).await,
    }
}
