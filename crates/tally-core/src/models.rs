//! Domain models for tally

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money;

/// Opaque identifier for a person, stable for the session
///
/// Derived as `person-N` from the position in the diner list at session start.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PersonId(String);

impl PersonId {
    pub fn from_index(index: usize) -> Self {
        Self(format!("person-{}", index))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PersonId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identifier for a line item, unique within the session
///
/// Derived as `item-N` during normalization. Split shares derive their own
/// identity as `<itemId>-split-<personId>` so each share can be tracked in
/// the assignment map independently.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(String);

impl ItemId {
    pub fn from_index(index: usize) -> Self {
        Self(format!("item-{}", index))
    }

    pub fn split_share(&self, person: &PersonId) -> Self {
        Self(format!("{}-split-{}", self.0, person))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A diner sharing the bill
///
/// Created when the people list is finalized; immutable for the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
}

/// Split provenance carried by a split share
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitInfo {
    /// Item the share was carved out of
    pub original_id: ItemId,
    /// How many ways the original item was split
    pub split_count: usize,
}

/// One indivisible, individually assignable unit of the bill
///
/// A receipt row for "3 x Coffee" becomes three `LineItem`s, each carrying
/// the exact per-unit price and its position within the original group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: ItemId,
    pub name: String,
    /// This unit's exact share of the original line amount
    pub price: Decimal,
    /// 1-based position within the origin group
    pub quantity_index: u32,
    /// Size of the origin group
    pub total_quantity: u32,
    /// Present when this record is a share of a split item
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split: Option<SplitInfo>,
}

impl LineItem {
    pub fn is_split(&self) -> bool {
        self.split.is_some()
    }

    /// Derive one share of this item for `person`, priced at `share`
    pub fn to_split_share(&self, person: &PersonId, share: Decimal, split_count: usize) -> Self {
        Self {
            id: self.id.split_share(person),
            name: self.name.clone(),
            price: share,
            quantity_index: self.quantity_index,
            total_quantity: self.total_quantity,
            split: Some(SplitInfo {
                original_id: self.id.clone(),
                split_count,
            }),
        }
    }
}

/// Bill-level charges as declared on the receipt
///
/// All fields are exact decimals; `discounts` is always stored non-negative
/// because the sign in vision output is unreliable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeSummary {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub service_charge: Decimal,
    pub discounts: Decimal,
    pub total: Decimal,
}

impl ChargeSummary {
    /// Net shared charges: tax + service - discounts
    pub fn total_charges(&self) -> Decimal {
        self.tax + self.service_charge - self.discounts
    }
}

/// Raw vision-service payload, exactly as extracted from the receipt image
///
/// Numeric fields deserialize leniently (numbers, numeric strings, or null)
/// so one garbled field never aborts a whole scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawBill {
    #[serde(default)]
    pub items: Vec<RawLineItem>,
    pub summary: Option<RawSummary>,
}

/// One extracted receipt row: a distinct product, possibly several units
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawLineItem {
    pub name: String,
    /// Price for a single unit
    #[serde(default, deserialize_with = "money::lenient")]
    pub rate: Decimal,
    /// Total price for the line
    #[serde(default, deserialize_with = "money::lenient")]
    pub price: Decimal,
}

/// Extracted summary block
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSummary {
    #[serde(default, deserialize_with = "money::lenient")]
    pub subtotal: Decimal,
    #[serde(default, deserialize_with = "money::lenient")]
    pub tax: Decimal,
    #[serde(default, deserialize_with = "money::lenient")]
    pub service_charge: Decimal,
    #[serde(default, deserialize_with = "money::lenient")]
    pub discounts: Decimal,
    #[serde(default, deserialize_with = "money::lenient")]
    pub total: Decimal,
}

/// Items-vs-subtotal disagreement found during normalization
///
/// Non-fatal: the declared summary stays the source of truth for charge
/// allocation, this just tells the user to double-check the scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtotalMismatch {
    pub items_total: Decimal,
    pub declared_subtotal: Decimal,
}

impl SubtotalMismatch {
    pub fn discrepancy(&self) -> Decimal {
        (self.items_total - self.declared_subtotal).abs()
    }
}

/// Output of receipt normalization: unit-priced items plus verified summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedBill {
    pub items: Vec<LineItem>,
    pub summary: ChargeSummary,
    pub subtotal_mismatch: Option<SubtotalMismatch>,
}

/// Value-semantics snapshot of the bill, used as the editing baseline
///
/// Taken right after normalization and again at every successful edit save;
/// never aliased to the working copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillSnapshot {
    pub items: Vec<LineItem>,
    pub summary: ChargeSummary,
}

/// One consolidated bill row: all units of a product folded into one line
///
/// Used both to review a scanned bill ("2 x Coffee  6.00") and as the
/// editable row format the bill editor works with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillRow {
    pub name: String,
    pub quantity: u32,
    /// Line total for all units of this row
    pub price: Decimal,
}

impl BillRow {
    /// Exact per-unit price; the full line total when quantity is zero
    pub fn unit_price(&self) -> Decimal {
        if self.quantity > 0 {
            self.price / Decimal::from(self.quantity)
        } else {
            self.price
        }
    }
}

/// Discount entry mode for the bill editor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Discount {
    /// A fixed amount off the bill
    Absolute(Decimal),
    /// A percentage of the live-computed subtotal
    Percent(Decimal),
}

impl Discount {
    /// Resolve to a non-negative absolute amount against `subtotal`
    pub fn resolve(&self, subtotal: Decimal) -> Decimal {
        match self {
            Discount::Absolute(amount) => amount.abs(),
            Discount::Percent(percent) => (subtotal * *percent / Decimal::from(100)).abs(),
        }
    }
}

/// Edited charge fields submitted with an edit save
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditedCharges {
    pub tax: Decimal,
    pub service_charge: Decimal,
    pub discount: Discount,
}

/// Result of saving bill edits
#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome {
    /// Number of line items after regeneration
    pub item_count: usize,
    /// True when an assignment flow was in progress and had to be discarded
    pub flow_restarted: bool,
}

/// One person's share of the reconciled bill
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonTotal {
    pub person: Person,
    /// Sum of this person's assigned item prices
    pub subtotal: Decimal,
    /// Pro-rata share of tax/service/discounts; zero for non-diners
    pub charges_share: Decimal,
    /// subtotal + charges_share, plus any absorbed rounding residue
    pub total: Decimal,
    /// True when the person has at least one assigned item
    pub is_diner: bool,
}

/// Reconciled per-person totals for the current assignment state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciledTotals {
    pub person_totals: Vec<PersonTotal>,
    /// Always exactly the sum of the per-person totals
    pub grand_total: Decimal,
}

impl ReconciledTotals {
    pub fn assigned_subtotal(&self) -> Decimal {
        self.person_totals.iter().map(|p| p.subtotal).sum()
    }

    pub fn assigned_charges(&self) -> Decimal {
        self.person_totals.iter().map(|p| p.charges_share).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_split_share_id_derivation() {
        let item = ItemId::from_index(3);
        let person = PersonId::from_index(1);
        assert_eq!(item.split_share(&person).as_str(), "item-3-split-person-1");
    }

    #[test]
    fn test_discount_resolution() {
        assert_eq!(Discount::Absolute(dec!(15)).resolve(dec!(200)), dec!(15));
        assert_eq!(Discount::Percent(dec!(10)).resolve(dec!(200)), dec!(20));
        // Sign in the entry is unreliable, the resolved amount never is
        assert_eq!(Discount::Absolute(dec!(-15)).resolve(dec!(200)), dec!(15));
    }

    #[test]
    fn test_bill_row_unit_price() {
        let row = BillRow {
            name: "Coffee".to_string(),
            quantity: 3,
            price: dec!(9),
        };
        assert_eq!(row.unit_price(), dec!(3));
    }

    #[test]
    fn test_raw_bill_lenient_deserialization() {
        let payload = r#"{
            "items": [{"name": "Tea", "rate": "₹12.50", "price": 25.0}],
            "summary": {"subtotal": 25.0, "tax": null, "total": "25"}
        }"#;
        let raw: RawBill = serde_json::from_str(payload).unwrap();
        assert_eq!(raw.items[0].rate, dec!(12.50));
        assert_eq!(raw.items[0].price, dec!(25));
        let summary = raw.summary.unwrap();
        assert_eq!(summary.tax, Decimal::ZERO);
        assert_eq!(summary.service_charge, Decimal::ZERO);
        assert_eq!(summary.total, dec!(25));
    }
}
