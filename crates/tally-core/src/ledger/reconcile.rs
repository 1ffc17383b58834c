//! Charge reconciliation
//!
//! Computes each person's subtotal, their pro-rata share of tax/service/
//! discounts, and a grand total that is exactly the sum of the per-person
//! totals. Purely derived from the current assignment state; calling it
//! twice without an intervening mutation yields identical results.

use rust_decimal::Decimal;

use crate::models::{PersonTotal, ReconciledTotals};
use crate::money;

use super::Ledger;

impl Ledger {
    /// Reconcile the current assignment state into per-person totals
    ///
    /// Shared charges are allocated proportionally to each diner's subtotal:
    /// `chargeRatio = (tax + service - discounts) / billSubtotal`, where the
    /// bill subtotal falls back to the assigned subtotal when the receipt
    /// did not declare one. People with no assigned items are not diners and
    /// carry no charge share.
    ///
    /// Any residue beyond one cent between `assignedSubtotal + totalCharges`
    /// and the per-person sum is absorbed by the first diner in people
    /// order, so the displayed grand total always equals the sum of the
    /// displayed per-person totals exactly.
    pub fn reconcile(&self) -> ReconciledTotals {
        let total_charges = self.summary.total_charges();

        let assigned_subtotal: Decimal = self
            .people
            .iter()
            .flat_map(|p| self.assigned_to(&p.id))
            .map(|item| item.price)
            .sum();

        let bill_subtotal = if self.summary.subtotal.is_zero() {
            assigned_subtotal
        } else {
            self.summary.subtotal
        };
        let charge_ratio = if bill_subtotal > Decimal::ZERO {
            total_charges / bill_subtotal
        } else {
            Decimal::ZERO
        };

        let mut person_totals: Vec<PersonTotal> = self
            .people
            .iter()
            .map(|person| {
                let subtotal: Decimal =
                    self.assigned_to(&person.id).iter().map(|i| i.price).sum();
                let is_diner = !self.assigned_to(&person.id).is_empty();
                let charges_share = if is_diner {
                    subtotal * charge_ratio
                } else {
                    Decimal::ZERO
                };
                PersonTotal {
                    person: person.clone(),
                    subtotal,
                    charges_share,
                    total: subtotal + charges_share,
                    is_diner,
                }
            })
            .collect();

        let person_sum: Decimal = person_totals.iter().map(|p| p.total).sum();
        let discrepancy = assigned_subtotal + total_charges - person_sum;
        if discrepancy.abs() > money::cent() {
            if let Some(first_diner) = person_totals.iter_mut().find(|p| p.is_diner) {
                first_diner.total += discrepancy;
            }
        }

        let grand_total = person_totals.iter().map(|p| p.total).sum();
        ReconciledTotals {
            person_totals,
            grand_total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_fixtures::sample_ledger;
    use crate::ledger::Ledger;
    use crate::models::{RawBill, RawLineItem, RawSummary};
    use crate::normalize::normalize_bill;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn ledger_with_summary(summary: RawSummary, items: Vec<(&str, Decimal)>) -> Ledger {
        let raw = RawBill {
            items: items
                .into_iter()
                .map(|(name, price)| RawLineItem {
                    name: name.to_string(),
                    rate: price,
                    price,
                })
                .collect(),
            summary: Some(summary),
        };
        let bill = normalize_bill(&raw).unwrap();
        let names = vec!["Asha".to_string(), "Ben".to_string()];
        Ledger::new(&names, bill).unwrap()
    }

    #[test]
    fn test_proportional_charge_allocation() {
        // tax=18, subtotal=100: chargeRatio 0.18
        let mut ledger = ledger_with_summary(
            RawSummary {
                subtotal: dec!(100),
                tax: dec!(18),
                total: dec!(118),
                ..Default::default()
            },
            vec![("Thali", dec!(40)), ("Biryani", dec!(60))],
        );
        let asha = ledger.people()[0].id.clone();
        let ben = ledger.people()[1].id.clone();

        ledger.assign(&asha).unwrap();
        ledger.assign(&ben).unwrap();

        let totals = ledger.reconcile();
        let asha_share = &totals.person_totals[0];
        assert_eq!(asha_share.subtotal, dec!(40));
        assert_eq!(asha_share.charges_share, dec!(7.20));
        assert_eq!(asha_share.total, dec!(47.20));

        let ben_share = &totals.person_totals[1];
        assert_eq!(ben_share.total, dec!(70.80));
        assert_eq!(totals.grand_total, dec!(118.00));
    }

    #[test]
    fn test_grand_total_equals_person_sum_exactly() {
        let mut ledger = sample_ledger(&["Asha", "Ben", "Chloe"]);
        let people: Vec<_> = ledger.people().iter().map(|p| p.id.clone()).collect();

        let mut turn = 0;
        while !ledger.is_complete() {
            ledger.assign(&people[turn % people.len()]).unwrap();
            turn += 1;
        }

        let totals = ledger.reconcile();
        let person_sum: Decimal = totals.person_totals.iter().map(|p| p.total).sum();
        assert_eq!(person_sum, totals.grand_total);
    }

    #[test]
    fn test_first_diner_absorbs_discrepancy() {
        // Skipping an item leaves its charge share unallocated; the whole
        // residue lands on the first diner so the grand total still covers
        // the assigned subtotal plus all declared charges
        let mut ledger = ledger_with_summary(
            RawSummary {
                subtotal: dec!(100),
                tax: dec!(18),
                total: dec!(118),
                ..Default::default()
            },
            vec![("Thali", dec!(40)), ("Biryani", dec!(60))],
        );
        let asha = ledger.people()[0].id.clone();

        ledger.assign(&asha).unwrap();
        ledger.skip().unwrap();

        let totals = ledger.reconcile();
        let asha_share = &totals.person_totals[0];
        assert_eq!(asha_share.subtotal, dec!(40));
        assert_eq!(asha_share.charges_share, dec!(7.20));
        // 40 + 7.20 plus the 10.80 of charges nobody else is carrying
        assert_eq!(asha_share.total, dec!(58.00));
        assert_eq!(totals.grand_total, dec!(58.00));

        let person_sum: Decimal = totals.person_totals.iter().map(|p| p.total).sum();
        assert_eq!(person_sum, totals.grand_total);
    }

    #[test]
    fn test_skipped_only_people_are_not_diners() {
        let mut ledger = sample_ledger(&["Asha", "Ben"]);
        let asha = ledger.people()[0].id.clone();

        while !ledger.is_complete() {
            ledger.assign(&asha).unwrap();
        }

        let totals = ledger.reconcile();
        assert!(totals.person_totals[0].is_diner);
        assert!(!totals.person_totals[1].is_diner);
        assert_eq!(totals.person_totals[1].total, Decimal::ZERO);
        assert_eq!(totals.person_totals[1].charges_share, Decimal::ZERO);
    }

    #[test]
    fn test_missing_subtotal_falls_back_to_assigned() {
        let mut ledger = ledger_with_summary(
            RawSummary {
                subtotal: dec!(0),
                tax: dec!(5),
                total: dec!(55),
                ..Default::default()
            },
            vec![("Thali", dec!(50))],
        );
        let asha = ledger.people()[0].id.clone();
        ledger.assign(&asha).unwrap();

        let totals = ledger.reconcile();
        // Ratio computed against the assigned subtotal (50): 5/50 = 0.1
        assert_eq!(totals.person_totals[0].charges_share, dec!(5.00));
        assert_eq!(totals.grand_total, dec!(55.00));
    }

    #[test]
    fn test_no_diners_yields_zero_totals() {
        let mut ledger = sample_ledger(&["Asha", "Ben"]);
        while !ledger.is_complete() {
            ledger.skip().unwrap();
        }

        let totals = ledger.reconcile();
        assert!(totals.person_totals.iter().all(|p| !p.is_diner));
        assert_eq!(totals.grand_total, Decimal::ZERO);
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let mut ledger = sample_ledger(&["Asha", "Ben"]);
        let asha = ledger.people()[0].id.clone();
        let ben = ledger.people()[1].id.clone();
        ledger.assign(&asha).unwrap();
        ledger.split(&[ben, asha.clone()]).unwrap();

        let first = ledger.reconcile();
        let second = ledger.reconcile();
        assert_eq!(first.grand_total, second.grand_total);
        for (a, b) in first.person_totals.iter().zip(&second.person_totals) {
            assert_eq!(a.total, b.total);
            assert_eq!(a.subtotal, b.subtotal);
            assert_eq!(a.charges_share, b.charges_share);
        }
    }
}
