//! Folio CLI: drive the photo ingestion pipeline from the command line.
//!
//! Configuration comes from FOLIO_* environment variables (or a `.env` file).

use anyhow::Context;
use clap::{Parser, Subcommand};
use folio_cli::{content_type_for, init_tracing, outcome_json};
use folio_core::{PipelineConfig, UploadCandidate};
use folio_processing::UploadPipeline;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "folio", about = "Item photo ingestion")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the storage directory for a category
    Ensure {
        /// Upload category (defaults to FOLIO_DEFAULT_CATEGORY)
        category: Option<String>,
    },
    /// Ingest image files and print the resulting derivative sets
    Ingest {
        /// Upload category (defaults to FOLIO_DEFAULT_CATEGORY)
        #[arg(long)]
        category: Option<String>,
        /// Declared media type for every file (guessed from the extension otherwise)
        #[arg(long)]
        content_type: Option<String>,
        /// Files to ingest; they are read, never moved
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Delete previously generated derivatives by storage key
    Reclaim {
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = PipelineConfig::from_env().context("Invalid FOLIO_* configuration")?;
    let default_category = config.default_category.clone();
    let pipeline = UploadPipeline::local(config);

    match cli.command {
        Commands::Ensure { category } => {
            let category = category.unwrap_or(default_category);
            pipeline
                .ensure_storage_ready(&category)
                .await
                .with_context(|| format!("Storage for category {} is unusable", category))?;
            print_json(&serde_json::json!({ "category": category, "ready": true }))?;
        }
        Commands::Ingest {
            category,
            content_type,
            files,
        } => {
            let category = category.unwrap_or(default_category);

            let mut candidates = Vec::with_capacity(files.len());
            for file in &files {
                let data = tokio::fs::read(file)
                    .await
                    .with_context(|| format!("Read {}", file.display()))?;
                let filename = file
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let declared = content_type
                    .clone()
                    .unwrap_or_else(|| content_type_for(file).to_string());
                candidates.push(UploadCandidate::in_memory(filename, declared, data));
            }

            let results = pipeline
                .process_uploads(&category, candidates)
                .await
                .context("Batch rejected")?;
            let report: Vec<Value> = results.iter().map(outcome_json).collect();
            print_json(&report)?;
        }
        Commands::Reclaim { paths } => {
            let summary = pipeline.reclaim(paths).await;
            print_json(&summary)?;
        }
    }

    Ok(())
}
