// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Tally Console
//!
//! Entry point for the `tally` binary. Parses CLI arguments, initializes
//! logging, and dispatches to a subcommand:
//!
//! - `demo`    : replay the reference walkthrough
//! - `run`     : execute a JSON scenario against a shared ledger
//! - `version` : print build version information

mod cli;
mod demo;
mod logging;
mod scenario;

use anyhow::{Context, Result};
use clap::Parser;

use cli::{Commands, TallyCli};
use logging::LogFormat;

fn main() -> Result<()> {
    let cli = TallyCli::parse();
    logging::init_logging(&cli.log.log_filter, LogFormat::from_str_lossy(&cli.log.log_format));

    match cli.command {
        Commands::Demo => {
            let stdout = std::io::stdout();
            demo::run_demo(&mut stdout.lock())
        }
        Commands::Run(args) => run_scenario(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Loads, runs and prints a scenario.
fn run_scenario(args: cli::RunArgs) -> Result<()> {
    tracing::info!(scenario = %args.scenario.display(), "running scenario");
    let scenario = scenario::Scenario::load(&args.scenario)?;
    let outcome = scenario::run(&scenario)?;

    if args.json {
        let json = serde_json::to_string_pretty(&outcome).context("failed to encode outcome")?;
        println!("{json}");
        return Ok(());
    }

    for verdict in &outcome.verdicts {
        match &verdict.reason {
            None => println!(
                "{}: accepted ({})",
                verdict.label,
                short_id(verdict.tx_id.as_deref())
            ),
            Some(reason) => println!("{}: rejected: {}", verdict.label, reason),
        }
    }
    println!();
    print!("{}", outcome.report);
    Ok(())
}

fn short_id(tx_id: Option<&str>) -> &str {
    tx_id.map_or("-", |id| &id[..id.len().min(16)])
}

/// Prints version information to stdout.
fn print_version() {
    println!("tally     {}", env!("CARGO_PKG_VERSION"));
    println!("protocol  {}", tally_protocol::config::PROTOCOL_VERSION);
    println!("signing   {}", tally_protocol::config::SIGNING_ALGORITHM);
    println!("tx ids    {}", tally_protocol::config::TX_ID_HASH_FUNCTION);
}
