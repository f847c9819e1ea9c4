//! Setu evidence store CLI
//!
//! Ingest evidence into the three tiers, retrieve it with fallback, verify
//! candidate files and attach ledger references.

use anyhow::Result;
use clap::{Parser, Subcommand};
use setu_cli::{
    config::{load_config, open_store, write_starter_config},
    handlers::{anchor, evidence, records, verify},
};
use setu_core::{CaseId, OfficerId, RecordId};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "setu")]
#[command(about = "Setu - redundant multi-tier evidence store", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path
    #[arg(short, long, global = true, default_value = ".setu/config.toml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter config with a freshly generated vault key
    Init,

    /// Store files in every tier and catalog them
    Ingest {
        /// Case the files belong to
        #[arg(long)]
        case: CaseId,

        /// Submitting officer
        #[arg(long)]
        officer: OfficerId,

        /// Files to submit
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Fetch a record's bytes, falling back across tiers
    Retrieve {
        /// Record id
        id: RecordId,

        /// Where to write the file (default: its original name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check files against their recorded fingerprints
    Verify {
        /// Match by file name within this case
        #[arg(long)]
        case: Option<CaseId>,

        /// Compare every file against this record
        #[arg(long)]
        record: Option<RecordId>,

        /// Candidate files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Attach a ledger reference to a record
    Confirm {
        /// Record id
        #[arg(required_unless_present = "batch")]
        id: Option<RecordId>,

        /// Anchoring transaction id
        #[arg(required_unless_present = "batch")]
        reference: Option<String>,

        /// JSON array of {"dbId", "txHash"} entries
        #[arg(long, conflicts_with_all = ["id", "reference"])]
        batch: Option<PathBuf>,
    },

    /// Show one catalog record
    Show {
        /// Record id
        id: RecordId,
    },

    /// List catalog records, newest first
    List {
        /// Only this case
        #[arg(long)]
        case: Option<CaseId>,
    },

    /// Check every tier's copy of a record
    Audit {
        /// Record id
        id: RecordId,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Commands::Init = cli.command {
        write_starter_config(&cli.config)?;
        println!("Wrote {}", cli.config.display());
        return Ok(());
    }

    let config = load_config(&cli.config)?;
    let store = open_store(&config)?;

    let output = match cli.command {
        Commands::Init => unreachable!("handled above"),
        Commands::Ingest {
            case,
            officer,
            files,
        } => evidence::ingest(&store, case, officer, &files).await?,
        Commands::Retrieve { id, output } => {
            evidence::retrieve(&store, id, output.as_deref()).await?
        }
        Commands::Verify {
            case,
            record,
            files,
        } => verify::verify(&store, case.as_ref(), record, &files).await?,
        Commands::Confirm {
            batch: Some(path), ..
        } => anchor::confirm_batch(&store, &path).await?,
        Commands::Confirm {
            id: Some(id),
            reference: Some(reference),
            ..
        } => anchor::confirm(&store, id, &reference).await?,
        Commands::Confirm { .. } => {
            anyhow::bail!("confirm needs an id and a reference, or --batch")
        }
        Commands::Show { id } => records::show(&store, id).await?,
        Commands::List { case } => records::list(&store, case.as_ref()).await?,
        Commands::Audit { id } => records::audit(&store, id).await?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
