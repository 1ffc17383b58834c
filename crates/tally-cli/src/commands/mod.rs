//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `scan` - Extract a bill from a receipt image via the vision backend
//! - `show` - Review a saved bill payload
//! - `run` - The interactive assign/skip/split flow ending in a settlement

pub mod run;
pub mod scan;
pub mod show;

// Re-export command functions for main.rs
pub use run::*;
pub use scan::*;
pub use show::*;

use std::path::Path;

use anyhow::{Context, Result};
use tally_core::{consolidate_items, money, NormalizedBill, RawBill, SubtotalMismatch};

/// Load a saved bill payload as written by `tally scan --out`
pub fn load_bill(path: &Path) -> Result<RawBill> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read bill file: {}", path.display()))?;
    serde_json::from_str(&data)
        .with_context(|| format!("Not a valid bill payload: {}", path.display()))
}

/// Print a consolidated review of a normalized bill
pub fn print_review(bill: &NormalizedBill) {
    println!("\n🧾 Bill ({} items)", bill.items.len());
    println!("{}", "─".repeat(44));

    for row in consolidate_items(&bill.items) {
        println!(
            "  {} x {:<28} {:>9}",
            row.quantity,
            truncate(&row.name, 28),
            money::to_display(row.price)
        );
    }

    println!("{}", "─".repeat(44));
    let summary = &bill.summary;
    println!("  Subtotal {:>33}", money::to_display(summary.subtotal));
    if summary.tax > rust_decimal::Decimal::ZERO {
        println!("  Tax {:>38}", money::to_display(summary.tax));
    }
    if summary.service_charge > rust_decimal::Decimal::ZERO {
        println!(
            "  Service charge {:>27}",
            money::to_display(summary.service_charge)
        );
    }
    if summary.discounts > rust_decimal::Decimal::ZERO {
        println!("  Discounts {:>31} ", money::to_display(summary.discounts));
    }
    println!("  Total {:>36}", money::to_display(summary.total));

    if let Some(mismatch) = &bill.subtotal_mismatch {
        print_mismatch_warning(mismatch);
    }
}

pub fn print_mismatch_warning(mismatch: &SubtotalMismatch) {
    println!(
        "\n  ⚠️  Items add up to {} but the receipt says {} (off by {}).",
        money::to_display(mismatch.items_total),
        money::to_display(mismatch.declared_subtotal),
        money::to_display(mismatch.discrepancy())
    );
    println!("     Double-check the scan before splitting.");
}

/// Truncate a string to a maximum byte length, adding "..." if truncated
///
/// The cut always lands on a char boundary, so multibyte names (₹, regional
/// dish names) shorten cleanly instead of panicking mid-character.
pub fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max.saturating_sub(3);
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Coffee", 28), "Coffee");
        assert_eq!(truncate("A very long product name here", 10), "A very ...");
    }

    #[test]
    fn test_truncate_cuts_on_char_boundaries() {
        // The cut point (byte 21) lands inside the 3-byte ₹; it must step
        // back to the boundary rather than slicing mid-character
        assert_eq!(
            truncate("Paneer Tikka Masala ₹special", 24),
            "Paneer Tikka Masala ..."
        );
        assert_eq!(truncate("₹₹₹₹", 4), "...");
    }
}
