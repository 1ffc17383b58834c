//! The assignment flow: assign / skip / split, with exact undo
//!
//! Every forward decision appends one [`ActionLogEntry`] and advances the
//! cursor; `undo` pops the last entry, reverses exactly its recorded effect,
//! and steps the cursor back one item. The log is the only path back to an
//! earlier cursor position; there is no redo.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{ItemId, LineItem, PersonId};
use crate::split;

use super::Ledger;

/// One recorded assignment decision
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ActionLogEntry {
    /// Item handed to one person
    Assign { person: PersonId, item: LineItem },
    /// Item settled out of the bill
    Skip { item: LineItem },
    /// Item divided into shares, one per selected person
    Split {
        item: LineItem,
        shares: Vec<(PersonId, LineItem)>,
    },
}

impl Ledger {
    /// Assign the current item to `person` and advance
    pub fn assign(&mut self, person: &PersonId) -> Result<()> {
        self.require_person(person)?;
        let item = self.require_current_item()?;

        self.assignments
            .get_mut(person)
            .expect("validated above")
            .push(item.clone());
        self.log.push(ActionLogEntry::Assign {
            person: person.clone(),
            item,
        });
        self.cursor += 1;
        Ok(())
    }

    /// Skip the current item (nobody pays for it) and advance
    pub fn skip(&mut self) -> Result<()> {
        let item = self.require_current_item()?;

        self.skipped.push(item.clone());
        self.log.push(ActionLogEntry::Skip { item });
        self.cursor += 1;
        Ok(())
    }

    /// Split the current item among `people` (2 or more, in selection order)
    /// and advance
    ///
    /// The shares replace the item's single assignment slot: each selected
    /// person receives a split-share record whose prices sum exactly to the
    /// item price. Validation failures leave the state untouched.
    pub fn split(&mut self, people: &[PersonId]) -> Result<()> {
        for person in people {
            self.require_person(person)?;
        }
        for (i, person) in people.iter().enumerate() {
            if people[..i].contains(person) {
                return Err(Error::Validation(format!(
                    "Person selected twice for a split: {}",
                    person
                )));
            }
        }

        let item = self.require_current_item()?;
        let allocation = split::allocate(item.price, people)?;

        let shares: Vec<(PersonId, LineItem)> = allocation
            .into_iter()
            .map(|(person, amount)| {
                let share = item.to_split_share(&person, amount, people.len());
                (person, share)
            })
            .collect();

        for (person, share) in &shares {
            self.assignments
                .get_mut(person)
                .expect("validated above")
                .push(share.clone());
        }
        debug!(item = %item.id, ways = people.len(), "Split item");
        self.log.push(ActionLogEntry::Split { item, shares });
        self.cursor += 1;
        Ok(())
    }

    /// Reverse the most recent assign/skip/split and re-present that item
    pub fn undo(&mut self) -> Result<()> {
        let entry = self.log.pop().ok_or(Error::NothingToUndo)?;

        match entry {
            ActionLogEntry::Assign { person, item } => {
                self.remove_assigned(&person, &item.id);
                // A later unassign may have moved the item to skipped; the
                // item is about to be re-presented, so that copy goes too
                self.skipped.retain(|i| i.id != item.id);
            }
            ActionLogEntry::Skip { item } => {
                self.skipped.retain(|i| i.id != item.id);
            }
            ActionLogEntry::Split { shares, .. } => {
                for (person, share) in &shares {
                    self.remove_assigned(person, &share.id);
                    self.skipped.retain(|i| i.id != share.id);
                }
            }
        }

        self.cursor -= 1;
        Ok(())
    }

    /// Remove an already-assigned item (or split share) from `person` and
    /// move it to the skipped list
    ///
    /// This is a post-hoc correction from the summary view, not a flow
    /// action: it does not touch the action log and cannot be undone
    /// directly. The item stays settled out of the totals until the decision
    /// that produced it is undone or a later edit regenerates the bill.
    pub fn unassign(&mut self, person: &PersonId, item: &ItemId) -> Result<()> {
        self.require_person(person)?;
        let assigned = self.assignments.get_mut(person).expect("validated above");
        let index = assigned
            .iter()
            .position(|i| &i.id == item)
            .ok_or_else(|| {
                Error::NotFound(format!("item {} is not assigned to {}", item, person))
            })?;

        let removed = assigned.remove(index);
        debug!(item = %removed.id, person = %person, "Un-assigned item");
        self.skipped.push(removed);
        Ok(())
    }

    fn require_person(&self, person: &PersonId) -> Result<()> {
        if self.assignments.contains_key(person) {
            Ok(())
        } else {
            Err(Error::NotFound(format!("unknown person: {}", person)))
        }
    }

    fn require_current_item(&self) -> Result<LineItem> {
        self.items.get(self.cursor).cloned().ok_or(Error::FlowComplete)
    }

    fn remove_assigned(&mut self, person: &PersonId, item: &ItemId) {
        if let Some(assigned) = self.assignments.get_mut(person) {
            assigned.retain(|i| &i.id != item);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_fixtures::sample_ledger;
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[test]
    fn test_assign_advances_cursor() {
        let mut ledger = sample_ledger(&["Asha", "Ben"]);
        let asha = ledger.people()[0].id.clone();

        ledger.assign(&asha).unwrap();
        assert_eq!(ledger.progress(), (1, 6));
        assert_eq!(ledger.assigned_to(&asha).len(), 1);
        assert_eq!(ledger.assigned_to(&asha)[0].name, "Coffee");
    }

    #[test]
    fn test_skip_moves_item_to_skipped() {
        let mut ledger = sample_ledger(&["Asha", "Ben"]);
        ledger.skip().unwrap();
        assert_eq!(ledger.skipped_items().len(), 1);
        assert_eq!(ledger.progress(), (1, 6));
    }

    #[test]
    fn test_flow_reaches_complete() {
        let mut ledger = sample_ledger(&["Asha", "Ben"]);
        let asha = ledger.people()[0].id.clone();

        while !ledger.is_complete() {
            ledger.assign(&asha).unwrap();
        }
        assert!(ledger.is_complete());
        assert!(ledger.current_item().is_none());
        assert!(matches!(ledger.assign(&asha), Err(Error::FlowComplete)));
        assert!(matches!(ledger.skip(), Err(Error::FlowComplete)));
    }

    #[test]
    fn test_split_creates_exact_shares() {
        let mut ledger = sample_ledger(&["Asha", "Ben", "Chloe"]);
        let people: Vec<PersonId> = ledger.people().iter().map(|p| p.id.clone()).collect();
        let price = ledger.current_item().unwrap().price;

        ledger.split(&people).unwrap();

        let mut share_sum = Decimal::ZERO;
        for person in &people {
            let shares = ledger.assigned_to(person);
            assert_eq!(shares.len(), 1);
            let share = &shares[0];
            assert!(share.is_split());
            assert_eq!(share.split.as_ref().unwrap().split_count, 3);
            share_sum += share.price;
        }
        assert_eq!(share_sum, price);
        assert_eq!(ledger.progress(), (1, 6));
    }

    #[test]
    fn test_split_validation_leaves_state_untouched() {
        let mut ledger = sample_ledger(&["Asha", "Ben"]);
        let asha = ledger.people()[0].id.clone();

        let too_few = ledger.split(std::slice::from_ref(&asha));
        assert!(matches!(too_few, Err(Error::SplitTooFew(1))));

        let duplicated = ledger.split(&[asha.clone(), asha.clone()]);
        assert!(matches!(duplicated, Err(Error::Validation(_))));

        assert_eq!(ledger.progress(), (0, 6));
        assert!(ledger.assigned_to(&asha).is_empty());
        assert!(!ledger.can_undo());
    }

    #[test]
    fn test_undo_reverses_each_action_kind() {
        let mut ledger = sample_ledger(&["Asha", "Ben"]);
        let asha = ledger.people()[0].id.clone();
        let ben = ledger.people()[1].id.clone();

        ledger.assign(&asha).unwrap();
        ledger.skip().unwrap();
        ledger.split(&[ben.clone(), asha.clone()]).unwrap();
        assert_eq!(ledger.progress(), (3, 6));

        ledger.undo().unwrap();
        assert_eq!(ledger.progress(), (2, 6));
        assert!(ledger.assigned_to(&ben).is_empty());
        assert_eq!(ledger.assigned_to(&asha).len(), 1);

        ledger.undo().unwrap();
        assert!(ledger.skipped_items().is_empty());

        ledger.undo().unwrap();
        assert!(ledger.assigned_to(&asha).is_empty());
        assert_eq!(ledger.progress(), (0, 6));
        assert!(matches!(ledger.undo(), Err(Error::NothingToUndo)));
    }

    #[test]
    fn test_unassign_moves_item_to_skipped_without_log_entry() {
        let mut ledger = sample_ledger(&["Asha", "Ben"]);
        let asha = ledger.people()[0].id.clone();

        ledger.assign(&asha).unwrap();
        let item_id = ledger.assigned_to(&asha)[0].id.clone();
        ledger.unassign(&asha, &item_id).unwrap();
        assert!(ledger.assigned_to(&asha).is_empty());
        assert_eq!(ledger.skipped_items().len(), 1);

        // The only log entry is the original assign: unassign is not part of
        // the forward flow, so undoing now reverses the assign, not the move
        ledger.undo().unwrap();
        assert_eq!(ledger.progress(), (0, 6));
        assert!(matches!(ledger.undo(), Err(Error::NothingToUndo)));

        let again = ledger.unassign(&asha, &item_id);
        assert!(matches!(again, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_undo_after_unassign_reclaims_the_item() {
        let mut ledger = sample_ledger(&["Asha", "Ben"]);
        let asha = ledger.people()[0].id.clone();

        ledger.assign(&asha).unwrap();
        let item_id = ledger.assigned_to(&asha)[0].id.clone();
        ledger.unassign(&asha, &item_id).unwrap();
        assert_eq!(ledger.skipped_items().len(), 1);

        // Undoing the assign re-presents the item; the skipped copy the
        // unassign created must not linger behind it
        ledger.undo().unwrap();
        assert!(ledger.skipped_items().is_empty());
        assert_eq!(ledger.progress(), (0, 6));

        ledger.assign(&asha).unwrap();
        assert_eq!(ledger.assigned_to(&asha).len(), 1);
        assert!(ledger.skipped_items().is_empty());
    }

    #[test]
    fn test_unassigned_item_excluded_from_totals() {
        let mut ledger = sample_ledger(&["Asha", "Ben"]);
        let asha = ledger.people()[0].id.clone();
        let ben = ledger.people()[1].id.clone();

        ledger.assign(&asha).unwrap(); // Coffee 3.00
        while !ledger.is_complete() {
            ledger.assign(&ben).unwrap();
        }

        let item_id = ledger.assigned_to(&asha)[0].id.clone();
        ledger.unassign(&asha, &item_id).unwrap();

        let totals = ledger.reconcile();
        assert_eq!(totals.assigned_subtotal(), dec!(23.00));
        let asha_total = &totals.person_totals[0];
        assert!(!asha_total.is_diner);
        assert_eq!(asha_total.total, Decimal::ZERO);
    }
}
