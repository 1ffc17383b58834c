//! The interactive bill-splitting flow

use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{anyhow, Result};
use tally_core::{
    money, normalize_bill, render_settlement, Error, Ledger, LineItem, PersonId,
};

use super::{load_bill, print_review};

/// Split a saved bill among `people`, one item at a time
///
/// Presents each line item in turn; the user assigns it by person number,
/// skips it, splits it among several people, or undoes the last decision.
/// Ends with the reconciled settlement summary.
pub fn cmd_run(bill: &Path, people: &str, pay_to: Option<&str>) -> Result<()> {
    let names = parse_names(people);
    let raw = load_bill(bill)?;
    let normalized = normalize_bill(&raw)?;
    print_review(&normalized);

    let mut ledger = Ledger::new(&names, normalized)?;
    let ids: Vec<PersonId> = ledger.people().iter().map(|p| p.id.clone()).collect();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    while let Some(item) = ledger.current_item().cloned() {
        present_item(&ledger, &item);
        print!("> ");
        io::stdout().flush()?;

        let input = match lines.next() {
            Some(line) => line?,
            None => return Err(anyhow!("Input closed before the bill was settled")),
        };
        let input = input.trim();

        match input {
            "" => continue,
            "q" => {
                println!("Leaving the bill unsettled.");
                return Ok(());
            }
            "s" => {
                ledger.skip()?;
                println!("  Skipped.");
            }
            "u" => match ledger.undo() {
                Ok(()) => println!("  Undone."),
                Err(Error::NothingToUndo) => println!("  Nothing to undo yet."),
                Err(e) => return Err(e.into()),
            },
            "x" => {
                print!("  Split among (numbers, comma separated, in order): ");
                io::stdout().flush()?;
                let selection = match lines.next() {
                    Some(line) => line?,
                    None => return Err(anyhow!("Input closed before the bill was settled")),
                };
                match parse_selection(&selection, ids.len()) {
                    Ok(indices) => {
                        let chosen: Vec<PersonId> =
                            indices.iter().map(|&i| ids[i].clone()).collect();
                        match ledger.split(&chosen) {
                            Ok(()) => println!("  Split {} ways.", chosen.len()),
                            Err(e) => println!("  {}", e),
                        }
                    }
                    Err(e) => println!("  {}", e),
                }
            }
            _ => match parse_person_number(input, ids.len()) {
                Ok(index) => {
                    ledger.assign(&ids[index])?;
                    println!("  {} takes it.", ledger.people()[index].name);
                }
                Err(e) => println!("  {}", e),
            },
        }
    }

    let totals = ledger.reconcile();
    let pay_to = pay_to.unwrap_or(&ledger.people()[0].name);
    println!("\n{}", render_settlement(&ledger, &totals, pay_to));
    Ok(())
}

fn present_item(ledger: &Ledger, item: &LineItem) {
    let (decided, total) = ledger.progress();
    println!(
        "\nItem {} of {}: {} - {}",
        decided + 1,
        total,
        item.name,
        money::to_display(item.price)
    );
    if item.total_quantity > 1 {
        println!("  (unit {} of {})", item.quantity_index, item.total_quantity);
    }
    for (index, person) in ledger.people().iter().enumerate() {
        println!("  [{}] {}", index + 1, person.name);
    }
    println!("  [s] skip  [x] split  [u] undo  [q] quit");
}

/// Split a comma-separated list of diner names, dropping blank entries
fn parse_names(people: &str) -> Vec<String> {
    people
        .split(',')
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

/// Parse a 1-based person number into a zero-based index
fn parse_person_number(input: &str, count: usize) -> Result<usize> {
    let number: usize = input
        .parse()
        .map_err(|_| anyhow!("Enter a person number, s, x, u, or q"))?;
    if number == 0 || number > count {
        return Err(anyhow!("No person numbered {}", number));
    }
    Ok(number - 1)
}

/// Parse a comma-separated list of 1-based person numbers, keeping order
fn parse_selection(input: &str, count: usize) -> Result<Vec<usize>> {
    let mut indices = Vec::new();
    for part in input.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        indices.push(parse_person_number(part, count)?);
    }
    if indices.is_empty() {
        return Err(anyhow!("Pick at least two people to split among"));
    }
    Ok(indices)
}
