//! CLI argument definitions using clap
//!
//! This module contains the clap structs and enums for parsing CLI
//! arguments. The actual command implementations are in the `commands`
//! module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tally - split a restaurant bill from a scanned receipt
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Split a restaurant bill from a scanned receipt", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan a receipt image with the configured vision backend
    ///
    /// Requires GEMINI_API_KEY (or VISION_BACKEND=mock for a canned bill).
    Scan {
        /// Receipt image to scan (JPEG)
        #[arg(short, long)]
        image: PathBuf,

        /// Write the extracted payload as JSON for later `show`/`run` calls
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Review a saved bill without starting an assignment flow
    Show {
        /// Saved bill payload (JSON, as written by `tally scan --out`)
        #[arg(short, long)]
        bill: PathBuf,
    },

    /// Split a saved bill among diners, one item at a time
    Run {
        /// Saved bill payload (JSON, as written by `tally scan --out`)
        #[arg(short, long)]
        bill: PathBuf,

        /// Comma-separated diner names, 2 to 10, unique
        #[arg(short, long)]
        people: String,

        /// Who everyone should pay (defaults to the first diner)
        #[arg(long)]
        pay_to: Option<String>,
    },
}
