//! Receipt normalization
//!
//! Converts the raw vision payload (one row per distinct product, possibly
//! representing several units) into a flat sequence of unit-priced,
//! individually assignable [`LineItem`]s, and verifies the declared subtotal
//! against the item sum.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::{ChargeSummary, LineItem, NormalizedBill, RawBill, SubtotalMismatch};
use crate::money;

/// Largest items-vs-subtotal discrepancy we accept without a warning
fn mismatch_tolerance() -> Decimal {
    money::cent()
}

/// Normalize a raw vision payload into assignable line items
///
/// A missing/empty `items` array or a missing `summary` block means the scan
/// itself failed and is a hard error; the caller should return the user to
/// the capture step. Individual items with a non-positive rate or a negative
/// price are dropped with a diagnostic, and the bill proceeds without them.
pub fn normalize_bill(raw: &RawBill) -> Result<NormalizedBill> {
    if raw.items.is_empty() {
        return Err(Error::EmptyScan(
            "no line items found on the receipt".to_string(),
        ));
    }
    let raw_summary = raw
        .summary
        .as_ref()
        .ok_or_else(|| Error::EmptyScan("receipt summary block is missing".to_string()))?;

    let summary = ChargeSummary {
        subtotal: raw_summary.subtotal,
        tax: raw_summary.tax,
        service_charge: raw_summary.service_charge,
        // Sign of extracted discounts is unreliable
        discounts: raw_summary.discounts.abs(),
        total: raw_summary.total,
    };

    let subtotal_mismatch = verify_subtotal(raw, summary.subtotal);

    let mut items = Vec::new();
    let mut counter = 0usize;
    for raw_item in &raw.items {
        if raw_item.rate <= Decimal::ZERO || raw_item.price < Decimal::ZERO {
            warn!(
                name = %raw_item.name,
                rate = %raw_item.rate,
                price = %raw_item.price,
                "Skipping invalid line item"
            );
            continue;
        }

        let quantity = infer_quantity(raw_item.price, raw_item.rate);
        let unit_price = raw_item.price / Decimal::from(quantity);
        items.extend(expand_units(&raw_item.name, quantity, unit_price, &mut counter));
    }

    debug!(
        raw_items = raw.items.len(),
        line_items = items.len(),
        "Normalized receipt"
    );

    Ok(NormalizedBill {
        items,
        summary,
        subtotal_mismatch,
    })
}

/// Infer the unit count of a line from its amount and unit rate
///
/// `round_half_up(price / rate)`, coerced to at least 1 so a rate that does
/// not evenly divide the amount still yields one assignable unit.
fn infer_quantity(price: Decimal, rate: Decimal) -> u32 {
    let rounded = money::round_quantity(price / rate);
    match rounded.to_u32() {
        Some(0) | None => 1,
        Some(q) => q,
    }
}

/// Expand one bill row into `quantity` unit-priced line items
///
/// Shared by normalization and the bill editor so regenerated items follow
/// the exact same rule as freshly scanned ones.
pub(crate) fn expand_units(
    name: &str,
    quantity: u32,
    unit_price: Decimal,
    counter: &mut usize,
) -> Vec<LineItem> {
    (1..=quantity)
        .map(|index| {
            let item = LineItem {
                id: crate::models::ItemId::from_index(*counter),
                name: name.to_string(),
                price: unit_price,
                quantity_index: index,
                total_quantity: quantity,
                split: None,
            };
            *counter += 1;
            item
        })
        .collect()
}

/// Compare the sum of raw item prices against the declared subtotal
fn verify_subtotal(raw: &RawBill, declared_subtotal: Decimal) -> Option<SubtotalMismatch> {
    let items_total: Decimal = raw.items.iter().map(|item| item.price).sum();
    let discrepancy = (items_total - declared_subtotal).abs();

    if discrepancy > mismatch_tolerance() {
        warn!(
            %items_total,
            %declared_subtotal,
            "Item sum disagrees with declared subtotal; review the scan"
        );
        Some(SubtotalMismatch {
            items_total,
            declared_subtotal,
        })
    } else {
        None
    }
}
