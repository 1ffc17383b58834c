//! Saved-bill review command

use std::path::Path;

use anyhow::Result;
use tally_core::normalize_bill;

use super::{load_bill, print_review};

/// Normalize and print a saved bill payload
pub fn cmd_show(bill: &Path) -> Result<()> {
    let raw = load_bill(bill)?;
    let normalized = normalize_bill(&raw)?;
    print_review(&normalized);
    Ok(())
}
