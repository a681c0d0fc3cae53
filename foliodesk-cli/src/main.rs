//! Foliodesk CLI - Back-office file ingestion in your terminal

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{check, import, inspect};

/// Foliodesk - tabular file ingestion for back-office ledgers
#[derive(Parser)]
#[command(name = "fdesk", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show file stats, format check and a sample preview
    Inspect {
        /// Path to a .csv/.xlsx/.xls file
        file: PathBuf,
        /// Number of sample rows to show
        #[arg(long, default_value_t = 5)]
        rows: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate every row without touching any store
    Check {
        /// Path to a .csv/.xlsx/.xls file
        file: PathBuf,
        /// Record kind (customers, transactions)
        #[arg(long)]
        kind: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rehearse a full import against the in-memory ledger
    Import {
        /// Path to a .csv/.xlsx/.xls file
        file: PathBuf,
        /// Record kind (customers, transactions)
        #[arg(long)]
        kind: String,
        /// Tenant the batch belongs to
        #[arg(long, default_value = "default")]
        tenant: String,
        /// Mark the batch as live-environment data
        #[arg(long)]
        live: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // RUST_LOG opts into pipeline logs; default keeps stdout clean
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Inspect { file, rows, json } => inspect::run(&file, rows, json),
        Commands::Check { file, kind, json } => check::run(&file, &kind, json),
        Commands::Import {
            file,
            kind,
            tenant,
            live,
            json,
        } => import::run(&file, &kind, &tenant, live, json).await,
    }
}
