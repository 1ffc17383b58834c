//! Bill editing
//!
//! Edits operate on the baseline snapshot, not the live working copy, so an
//! in-progress assignment flow is undisturbed until a save. Saving
//! regenerates the flat item sequence with the same expansion rule as
//! normalization, replaces the summary, re-takes the baseline, and restarts
//! the flow when one was already underway: regenerated items have new
//! identities and prices, so prior per-diner decisions are meaningless.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::error::Result;
use crate::models::{BillRow, BillSnapshot, ChargeSummary, EditedCharges, LineItem, SaveOutcome};
use crate::normalize::expand_units;

use super::Ledger;

/// Live-recomputed totals for the editor, refreshed as any field changes
#[derive(Debug, Clone, PartialEq)]
pub struct EditTotals {
    pub subtotal: Decimal,
    /// The discount resolved to an absolute amount
    pub discount_amount: Decimal,
    pub total: Decimal,
}

/// Fold unit-priced line items back into one row per product name
///
/// Rows come out in first-appearance order. This is both the editor's row
/// format and the consolidated view used to review a scanned bill.
pub fn consolidate_items(items: &[LineItem]) -> Vec<BillRow> {
    let mut rows: Vec<BillRow> = Vec::new();
    for item in items {
        match rows.iter_mut().find(|row| row.name == item.name) {
            Some(row) => {
                row.quantity += 1;
                row.price += item.price;
            }
            None => rows.push(BillRow {
                name: item.name.clone(),
                quantity: 1,
                price: item.price,
            }),
        }
    }
    rows
}

/// Recompute the editor's summary line from the current field values
pub fn live_totals(rows: &[BillRow], charges: &EditedCharges) -> EditTotals {
    let subtotal: Decimal = rows.iter().map(|row| row.price).sum();
    let discount_amount = charges.discount.resolve(subtotal);
    EditTotals {
        subtotal,
        discount_amount,
        total: subtotal + charges.tax + charges.service_charge - discount_amount,
    }
}

impl Ledger {
    /// The baseline bill as consolidated, editable rows
    pub fn editable_rows(&self) -> Vec<BillRow> {
        consolidate_items(&self.baseline.items)
    }

    /// Apply edited rows and charges, regenerating the whole bill
    ///
    /// Rows with a blank name, zero quantity, or non-positive price are
    /// dropped. Returns whether an in-progress flow had to be restarted.
    pub fn save_edits(&mut self, rows: &[BillRow], charges: &EditedCharges) -> Result<SaveOutcome> {
        let mut items = Vec::new();
        let mut counter = 0usize;
        let mut kept_rows = Vec::new();
        for row in rows {
            let name = row.name.trim();
            if name.is_empty() || row.quantity == 0 || row.price <= Decimal::ZERO {
                debug!(name = %row.name, quantity = row.quantity, price = %row.price,
                    "Dropping edited row");
                continue;
            }
            let unit_price = row.price / Decimal::from(row.quantity);
            items.extend(expand_units(name, row.quantity, unit_price, &mut counter));
            kept_rows.push(row.clone());
        }

        if items.is_empty() {
            warn!("Edit save produced an empty bill");
        }

        let totals = live_totals(&kept_rows, charges);
        let summary = ChargeSummary {
            subtotal: totals.subtotal,
            tax: charges.tax,
            service_charge: charges.service_charge,
            discounts: totals.discount_amount,
            total: totals.total,
        };

        let flow_in_progress =
            self.cursor > 0 || !self.log.is_empty() || !self.skipped.is_empty();

        self.items = items;
        self.summary = summary;
        self.baseline = BillSnapshot {
            items: self.items.clone(),
            summary: self.summary.clone(),
        };
        // The edited bill supersedes whatever the scan claimed
        self.subtotal_mismatch = None;

        if flow_in_progress {
            for assigned in self.assignments.values_mut() {
                assigned.clear();
            }
            self.skipped.clear();
            self.log.clear();
            self.cursor = 0;
        }

        Ok(SaveOutcome {
            item_count: self.items.len(),
            flow_restarted: flow_in_progress,
        })
    }
}
