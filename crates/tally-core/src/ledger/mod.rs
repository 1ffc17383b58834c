//! In-memory session state and the operations that drive it
//!
//! The `Ledger` owns everything a splitting session needs: the diners, the
//! normalized item sequence, the assignment map, skipped items, the charge
//! summary, the flow cursor, the action log, and the immutable editing
//! baseline. It lives only for the active session; "reset" is building a
//! fresh one via [`Ledger::new`].
//!
//! The impl is organized by domain:
//! - `assign` - the one-item-at-a-time decision flow (assign/skip/split/undo)
//! - `reconcile` - per-person totals and charge allocation
//! - `edit` - consolidated editable rows and save-and-regenerate

use std::collections::HashMap;

use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{
    BillSnapshot, ChargeSummary, LineItem, NormalizedBill, Person, PersonId, SubtotalMismatch,
};

mod assign;
mod edit;
mod reconcile;

pub use assign::ActionLogEntry;
pub use edit::{consolidate_items, live_totals, EditTotals};

/// Minimum number of diners to split a bill
pub const MIN_PEOPLE: usize = 2;
/// Maximum number of diners per session
pub const MAX_PEOPLE: usize = 10;

/// The full state of one bill-splitting session
#[derive(Debug, Clone)]
pub struct Ledger {
    people: Vec<Person>,
    items: Vec<LineItem>,
    assignments: HashMap<PersonId, Vec<LineItem>>,
    skipped: Vec<LineItem>,
    summary: ChargeSummary,
    cursor: usize,
    log: Vec<ActionLogEntry>,
    baseline: BillSnapshot,
    subtotal_mismatch: Option<SubtotalMismatch>,
}

impl Ledger {
    /// Start a session from diner names and a normalized bill
    ///
    /// Names must be non-empty, unique case-insensitively, and between
    /// [`MIN_PEOPLE`] and [`MAX_PEOPLE`] of them. The baseline snapshot for
    /// later edits is taken here, as an independent copy of the working data.
    pub fn new(names: &[String], bill: NormalizedBill) -> Result<Self> {
        if names.len() < MIN_PEOPLE {
            return Err(Error::Validation(format!(
                "You need at least {} people to split a bill",
                MIN_PEOPLE
            )));
        }
        if names.len() > MAX_PEOPLE {
            return Err(Error::Validation(format!(
                "At most {} people are supported",
                MAX_PEOPLE
            )));
        }

        let mut seen = Vec::with_capacity(names.len());
        let mut people = Vec::with_capacity(names.len());
        for (index, name) in names.iter().enumerate() {
            let name = name.trim();
            if name.is_empty() {
                return Err(Error::Validation(
                    "Every person needs a name".to_string(),
                ));
            }
            let folded = name.to_lowercase();
            if seen.contains(&folded) {
                return Err(Error::Validation(format!(
                    "Person names must be unique: \"{}\" appears twice",
                    name
                )));
            }
            seen.push(folded);
            people.push(Person {
                id: PersonId::from_index(index),
                name: name.to_string(),
            });
        }

        let assignments = people
            .iter()
            .map(|p| (p.id.clone(), Vec::new()))
            .collect();
        let baseline = BillSnapshot {
            items: bill.items.clone(),
            summary: bill.summary.clone(),
        };

        debug!(
            people = people.len(),
            items = bill.items.len(),
            "Session started"
        );

        Ok(Self {
            people,
            items: bill.items,
            assignments,
            skipped: Vec::new(),
            summary: bill.summary,
            cursor: 0,
            log: Vec::new(),
            baseline,
            subtotal_mismatch: bill.subtotal_mismatch,
        })
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }

    pub fn person(&self, id: &PersonId) -> Option<&Person> {
        self.people.iter().find(|p| &p.id == id)
    }

    /// The working item sequence the flow iterates over
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn skipped_items(&self) -> &[LineItem] {
        &self.skipped
    }

    pub fn summary(&self) -> &ChargeSummary {
        &self.summary
    }

    /// Items (and split shares) currently assigned to `person`
    pub fn assigned_to(&self, person: &PersonId) -> &[LineItem] {
        self.assignments
            .get(person)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The item the flow is currently presenting, if any
    pub fn current_item(&self) -> Option<&LineItem> {
        self.items.get(self.cursor)
    }

    /// (decided, total) progress through the item sequence
    pub fn progress(&self) -> (usize, usize) {
        (self.cursor, self.items.len())
    }

    /// True once every item has been assigned, skipped, or split
    pub fn is_complete(&self) -> bool {
        self.cursor >= self.items.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.log.is_empty()
    }

    /// The editing baseline: the bill as captured at normalization or the
    /// last successful edit save
    pub fn baseline(&self) -> &BillSnapshot {
        &self.baseline
    }

    /// Items-vs-subtotal warning carried over from normalization, if any
    pub fn subtotal_mismatch(&self) -> Option<&SubtotalMismatch> {
        self.subtotal_mismatch.as_ref()
    }
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    use rust_decimal_macros::dec;

    use crate::models::{RawBill, RawLineItem, RawSummary};
    use crate::normalize::normalize_bill;

    use super::Ledger;

    /// Coffee 3 x 3.00, Pizza 1 x 12.00, Lassi 2 x 2.50 => subtotal 26,
    /// tax 2.60, total 28.60. Six line items after normalization.
    pub fn sample_bill() -> RawBill {
        RawBill {
            items: vec![
                RawLineItem {
                    name: "Coffee".to_string(),
                    rate: dec!(3),
                    price: dec!(9),
                },
                RawLineItem {
                    name: "Pizza".to_string(),
                    rate: dec!(12),
                    price: dec!(12),
                },
                RawLineItem {
                    name: "Lassi".to_string(),
                    rate: dec!(2.50),
                    price: dec!(5),
                },
            ],
            summary: Some(RawSummary {
                subtotal: dec!(26),
                tax: dec!(2.60),
                service_charge: dec!(0),
                discounts: dec!(0),
                total: dec!(28.60),
            }),
        }
    }

    pub fn sample_ledger(names: &[&str]) -> Ledger {
        let bill = normalize_bill(&sample_bill()).unwrap();
        let names: Vec<String> = names.iter().map(|n| n.to_string()).collect();
        Ledger::new(&names, bill).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_fixtures::sample_ledger;
    use super::*;
    use crate::normalize::normalize_bill;

    #[test]
    fn test_new_session_starts_at_first_item() {
        let ledger = sample_ledger(&["Asha", "Ben"]);
        assert_eq!(ledger.people().len(), 2);
        assert_eq!(ledger.items().len(), 6);
        assert_eq!(ledger.progress(), (0, 6));
        assert!(!ledger.is_complete());
        assert_eq!(ledger.current_item().unwrap().name, "Coffee");
    }

    #[test]
    fn test_baseline_is_an_independent_copy() {
        let mut ledger = sample_ledger(&["Asha", "Ben"]);
        let person = ledger.people()[0].id.clone();
        ledger.assign(&person).unwrap();
        // Mutating the working state never touches the baseline
        assert_eq!(ledger.baseline().items.len(), 6);
        assert_eq!(ledger.baseline().items[0].name, "Coffee");
    }

    #[test]
    fn test_name_validation() {
        let bill = || normalize_bill(&test_fixtures::sample_bill()).unwrap();

        let one = vec!["Asha".to_string()];
        assert!(Ledger::new(&one, bill()).is_err());

        let blank = vec!["Asha".to_string(), "  ".to_string()];
        assert!(Ledger::new(&blank, bill()).is_err());

        let dupes = vec!["Asha".to_string(), "ASHA".to_string()];
        assert!(Ledger::new(&dupes, bill()).is_err());

        let crowd: Vec<String> = (0..11).map(|i| format!("P{}", i)).collect();
        assert!(Ledger::new(&crowd, bill()).is_err());

        let ok = vec!["Asha".to_string(), "Ben".to_string()];
        assert!(Ledger::new(&ok, bill()).is_ok());
    }
}
