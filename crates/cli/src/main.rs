//! Snapdelta CLI - snapdelta command

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

mod cmd;
mod config;
mod logging;
mod util;

use config::Settings;

/// Snapdelta - Emit only the records that changed since the last snapshot
#[derive(Parser)]
#[command(name = "snapdelta")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// TOML settings file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log level or filter directive (RUST_LOG takes precedence)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// No progress spinner or summary; warnings and errors only
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the delta of a CSV snapshot
    Csv {
        /// Snapshot file (first row is the header)
        snapshot: PathBuf,
        /// Identity column: header name or 0-based index
        id_column: String,
        /// Fingerprints file written by the previous run
        previous: Option<PathBuf>,
        /// Field delimiter (single ASCII character)
        #[arg(short, long, default_value = ",")]
        delimiter: char,
        /// Write outputs here instead of next to the snapshot
        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,
    },
    /// Compute the delta of a JSON snapshot
    Json {
        /// Snapshot file
        snapshot: PathBuf,
        /// Dotted path to the record array (`item` steps into arrays, empty for a root array)
        entries_path: String,
        /// Identity path within each record (e.g. `$.id`)
        id_path: String,
        /// Fingerprints file written by the previous run
        previous: Option<PathBuf>,
        /// Write outputs here instead of next to the snapshot
        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,
    },
    /// Summarize a fingerprints file or look up one identity
    Inspect {
        /// Fingerprints file
        fingerprints: PathBuf,
        /// Print the digest recorded for this identity
        #[arg(long)]
        identity: Option<String>,
        /// List every entry in identity order
        #[arg(long)]
        list: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = Settings::resolve(&cli.global)?;
    logging::init(&settings.logging, cli.global.quiet)?;

    match cli.command {
        Commands::Csv { snapshot, id_column, previous, delimiter, out_dir } => {
            let output = settings.output.with_dir(out_dir);
            cmd::csv::run(&snapshot, &id_column, previous, delimiter, &output, cli.global.quiet)
        }
        Commands::Json { snapshot, entries_path, id_path, previous, out_dir } => {
            let output = settings.output.with_dir(out_dir);
            cmd::json::run(&snapshot, &entries_path, &id_path, previous, &output, cli.global.quiet)
        }
        Commands::Inspect { fingerprints, identity, list } => {
            cmd::inspect::run(&fingerprints, identity.as_deref(), list)
        }
    }
}
