//! Settlement summary rendering
//!
//! Builds the plain-text settlement a user sends to the table after the
//! flow completes: one block per diner with their items and charge share,
//! the skipped items, the original bill breakdown, and who to pay. Pure
//! string assembly; the caller decides where it goes.

use std::fmt::Write;

use chrono::Local;

use crate::ledger::Ledger;
use crate::models::ReconciledTotals;
use crate::money::to_display;

/// Render the settlement for the given reconciled totals
pub fn render_settlement(ledger: &Ledger, totals: &ReconciledTotals, pay_to: &str) -> String {
    let mut out = String::new();
    let now = Local::now().format("%Y-%m-%d %H:%M");
    let _ = writeln!(out, "Tally Summary - {}", now);
    let _ = writeln!(out);

    for person_total in &totals.person_totals {
        if !person_total.is_diner {
            continue;
        }
        let _ = writeln!(
            out,
            "{} owes {}",
            person_total.person.name,
            to_display(person_total.total)
        );
        for item in ledger.assigned_to(&person_total.person.id) {
            let split_cue = match &item.split {
                Some(info) => format!(" (split 1/{})", info.split_count),
                None => String::new(),
            };
            let _ = writeln!(out, "  - {}{} ({})", item.name, split_cue, to_display(item.price));
        }
        let _ = writeln!(
            out,
            "  - Tax/Service share ({})",
            to_display(person_total.charges_share)
        );
        let _ = writeln!(out);
    }

    if !ledger.skipped_items().is_empty() {
        let _ = writeln!(out, "--------------------------------");
        let _ = writeln!(out, "Skipped items (not included in totals)");
        for item in ledger.skipped_items() {
            let _ = writeln!(out, "  - {} ({})", item.name, to_display(item.price));
        }
        let _ = writeln!(out);
    }

    let summary = ledger.summary();
    let _ = writeln!(out, "--------------------------------");
    let _ = writeln!(out, "Original bill breakdown:");
    let _ = writeln!(out, "Subtotal: {}", to_display(summary.subtotal));
    if summary.tax > rust_decimal::Decimal::ZERO {
        let _ = writeln!(out, "Tax: {}", to_display(summary.tax));
    }
    if summary.service_charge > rust_decimal::Decimal::ZERO {
        let _ = writeln!(out, "Service: {}", to_display(summary.service_charge));
    }
    if summary.discounts > rust_decimal::Decimal::ZERO {
        let _ = writeln!(out, "Discounts: -{}", to_display(summary.discounts));
    }
    let _ = writeln!(out, "Grand total: {}", to_display(summary.total));
    let _ = writeln!(out);
    let _ = writeln!(out, "Total settled: {}", to_display(totals.grand_total));
    let _ = writeln!(out);
    let _ = write!(out, "Please pay to: {}", pay_to);

    out
}
