//! moviedb-ingest - Movie catalog ingestion tool

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use moviedb_common::logging::{init_logging, LogConfig, LogLevel};
use moviedb_ingest::engine::LoadReport;
use moviedb_ingest::sources::TmdbClient;
use moviedb_ingest::{IngestConfig, Loader};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "moviedb-ingest")]
#[command(author, version, about = "Load movie metadata into PostgreSQL")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Rows per batched insert (overrides INGEST_BATCH_SIZE)
    #[arg(short, long, global = true)]
    batch_size: Option<usize>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply schema migrations
    Migrate,

    /// Load movies_metadata.csv
    Movies {
        #[arg(default_value = "./data/movies_metadata.csv")]
        file: PathBuf,
    },

    /// Load credits.csv
    Credits {
        #[arg(default_value = "./data/credits.csv")]
        file: PathBuf,
    },

    /// Load keywords.csv
    Keywords {
        #[arg(default_value = "./data/keywords.csv")]
        file: PathBuf,
    },

    /// Load all three Kaggle files from a directory
    Kaggle {
        #[arg(default_value = "./data")]
        dir: PathBuf,
    },

    /// Load now-playing movies from the TMDB API
    Tmdb {
        /// Stop after this many listing pages
        #[arg(long)]
        max_pages: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    // Environment variables take precedence
    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("moviedb-ingest")
        .build()
        .merge_env()?;

    let _guard = init_logging(&log_config)?;

    let mut config = IngestConfig::from_env().context("Invalid ingest configuration")?;
    if let Some(batch_size) = cli.batch_size {
        config.batch_size = batch_size;
        config.validate()?;
    }

    let loader = Loader::connect(config)
        .await
        .context("Failed to connect to database")?;

    let reports = match cli.command {
        Command::Migrate => {
            loader.migrate().await?;
            Vec::new()
        },
        Command::Movies { file } => vec![loader
            .load_movies_file(&file, None)
            .await
            .with_context(|| format!("Failed to load {}", file.display()))?],
        Command::Credits { file } => vec![loader
            .load_credits_file(&file, None)
            .await
            .with_context(|| format!("Failed to load {}", file.display()))?],
        Command::Keywords { file } => vec![loader
            .load_keywords_file(&file, None)
            .await
            .with_context(|| format!("Failed to load {}", file.display()))?],
        Command::Kaggle { dir } => loader
            .load_kaggle(&dir)
            .await
            .with_context(|| format!("Failed to load Kaggle dataset from {}", dir.display()))?,
        Command::Tmdb { max_pages } => {
            let mut tmdb = loader.config().tmdb.clone();
            if max_pages.is_some() {
                tmdb.max_pages = max_pages;
            }
            let client = TmdbClient::new(tmdb)?;
            loader
                .load_tmdb(&client, None)
                .await
                .context("Failed to load from TMDB")?
        },
    };

    summarize(&reports);
    info!("Ingestion complete");
    Ok(())
}

fn summarize(reports: &[LoadReport]) {
    for report in reports {
        info!(
            group = report.group,
            entities = report.entities,
            finalized_rows = report.finalized_rows,
            elapsed_secs = report.elapsed.as_secs_f64(),
            "Group loaded"
        );
    }
}
