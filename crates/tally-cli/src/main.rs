//! Tally CLI - split a restaurant bill from a scanned receipt
//!
//! Usage:
//!   tally scan --image receipt.jpg --out bill.json   Extract a bill via the vision backend
//!   tally show --bill bill.json                      Review a saved bill
//!   tally run --bill bill.json --people Asha,Ben     Split it interactively

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Scan { image, out } => commands::cmd_scan(&image, out.as_deref()).await,
        Commands::Show { bill } => commands::cmd_show(&bill),
        Commands::Run {
            bill,
            people,
            pay_to,
        } => commands::cmd_run(&bill, &people, pay_to.as_deref()),
    }
}
