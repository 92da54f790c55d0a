//! Expense commands

use std::io::Write;

use anyhow::{Context, Result};

use super::Services;
use crate::cli::ExpenseCommand;
use crate::expenses::NewExpense;
use crate::format::format_currency;

pub fn execute(services: &Services, action: ExpenseCommand, out: &mut dyn Write) -> Result<()> {
    let tracker = services.expenses();
    match action {
        ExpenseCommand::Add {
            trip,
            amount,
            category,
            description,
            date,
        } => {
            let expense = tracker
                .add(NewExpense {
                    trip_id: trip,
                    amount,
                    category,
                    description,
                    date,
                })
                .context("Could not add expense")?;
            writeln!(
                out,
                "Added {} {} expense ({})",
                category.icon(),
                category.label(),
                expense.id
            )?;
        }
        ExpenseCommand::List { trip } => {
            let currency = trip_currency(services, &trip)?;
            let expenses = tracker.for_trip(&trip);
            if expenses.is_empty() {
                writeln!(out, "No expenses yet")?;
            }
            for e in &expenses {
                let description = if e.description.is_empty() {
                    "No description"
                } else {
                    e.description.as_str()
                };
                writeln!(
                    out,
                    "{}  {}  {} {:<16} {:>12}  {}",
                    e.id,
                    e.date,
                    e.category.icon(),
                    e.category.label(),
                    format_currency(e.amount, &currency),
                    description
                )?;
            }
        }
        ExpenseCommand::Delete { id } => {
            tracker.delete(&id)?;
            writeln!(out, "Deleted expense {}", id)?;
        }
        ExpenseCommand::Summary { trip } => {
            let trip = services
                .trips()
                .get(&trip)
                .with_context(|| format!("Trip not found: {}", trip))?;
            let breakdown = tracker.breakdown(&trip.id);

            writeln!(out, "{}: {} expense(s)", trip.name, breakdown.count)?;
            for category in &breakdown.categories {
                writeln!(
                    out,
                    "  {} {:<16} {:>12}  {:>5.1}%",
                    category.category.icon(),
                    category.category.label(),
                    format_currency(category.amount, &trip.currency),
                    category.percentage
                )?;
            }
            writeln!(out, "  Total spent: {}", format_currency(breakdown.total, &trip.currency))?;
            writeln!(
                out,
                "  Remaining:   {}",
                format_currency(tracker.remaining_budget(&trip), &trip.currency)
            )?;
        }
    }
    Ok(())
}

fn trip_currency(services: &Services, trip_id: &str) -> Result<String> {
    services
        .trips()
        .get(trip_id)
        .map(|trip| trip.currency)
        .with_context(|| format!("Trip not found: {}", trip_id))
}
