//! Split allocation
//!
//! Divides one item's price among a chosen set of diners with deterministic
//! remainder distribution: everyone gets the floor-to-cent base share, and
//! leftover cents go one at a time to people in selection order. The shares
//! always sum back to the original price exactly.

use rust_decimal::Decimal;

use crate::error::{Error, Result};
use crate::models::PersonId;
use crate::money;

/// Allocate `price` among `people`, in their selection order
///
/// Requires at least 2 people. The first `remainder / 0.01` people receive
/// one extra cent on top of the base share.
pub fn allocate(price: Decimal, people: &[PersonId]) -> Result<Vec<(PersonId, Decimal)>> {
    if people.len() < 2 {
        return Err(Error::SplitTooFew(people.len()));
    }

    let count = Decimal::from(people.len());
    let base = money::floor_cents(price / count);
    let mut remainder = price - base * count;

    let shares = people
        .iter()
        .map(|person| {
            let mut share = base;
            // Only whole cents are handed out; a sub-cent residue in the
            // price itself stays unallocated rather than inflating a share
            if remainder >= money::cent() {
                share += money::cent();
                remainder -= money::cent();
            }
            (person.clone(), share)
        })
        .collect();

    Ok(shares)
}
