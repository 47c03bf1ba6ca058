//! # CLI Interface
//!
//! Defines the command-line argument structure for `tally` using `clap`
//! derive. Supports three subcommands: `demo`, `run`, and `version`.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Default `EnvFilter` directives: this binary at `info`, the library quiet.
pub const DEFAULT_LOG_FILTER: &str = "tally_node=info,tally_protocol=warn";

/// Tally ledger console driver.
///
/// Replays the reference walkthrough or runs a JSON scenario of accounts
/// and signed transactions against an in-memory ledger.
#[derive(Parser, Debug)]
#[command(
    name = "tally",
    about = "Signed-input account ledger console",
    version,
    propagate_version = true
)]
pub struct TallyCli {
    #[command(flatten)]
    pub log: LogArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Logging flags shared by every subcommand.
#[derive(Args, Debug)]
pub struct LogArgs {
    /// `EnvFilter` directives, e.g. `tally_protocol=debug`.
    #[arg(long, global = true, env = "TALLY_LOG", default_value = DEFAULT_LOG_FILTER)]
    pub log_filter: String,

    /// Log output format: `pretty` or `json`.
    #[arg(long, global = true, env = "TALLY_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,
}

/// Top-level subcommands for the `tally` binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Walk through balance edits, aggregate debit checks, signature
    /// checks and a full transaction, printing each result.
    Demo,
    /// Run a JSON scenario file.
    Run(RunArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to the scenario file (JSON).
    #[arg(long, short = 's', env = "TALLY_SCENARIO")]
    pub scenario: PathBuf,

    /// Print the full outcome (per-transaction verdicts and final balances)
    /// as JSON instead of the text report.
    #[arg(long)]
    pub json: bool,
}
