//! Trip commands

use std::io::Write;

use anyhow::{Context, Result};

use super::Services;
use crate::cli::TripCommand;
use crate::data::Trip;
use crate::format::format_currency;
use crate::trips::{share_text, NewDestination, NewTrip};

pub fn execute(services: &Services, action: TripCommand, out: &mut dyn Write) -> Result<()> {
    let trips = services.trips();
    match action {
        TripCommand::Create {
            name,
            start,
            end,
            budget,
            currency,
            description,
        } => {
            let trip = trips
                .create(NewTrip {
                    name,
                    start_date: start,
                    end_date: end,
                    budget,
                    currency,
                    description,
                })
                .context("Could not create trip")?;
            writeln!(out, "Created trip {} ({})", trip.name, trip.id)?;
        }
        TripCommand::List { search } => {
            let list = match search {
                Some(text) => trips.search(&text),
                None => trips.list(),
            };
            if list.is_empty() {
                writeln!(out, "No trips found")?;
            }
            for trip in &list {
                writeln!(
                    out,
                    "{}  {:<24} {} to {}  {}  {}",
                    trip.id,
                    trip.name,
                    trip.start_date,
                    trip.end_date,
                    format_currency(trip.total_budget(), &trip.currency),
                    trip.destination_summary()
                )?;
            }
        }
        TripCommand::Show { id } => {
            let trip = trips
                .get(&id)
                .with_context(|| format!("Trip not found: {}", id))?;
            write_trip(&trip, out)?;
        }
        TripCommand::Delete { id } => {
            let trip = trips.delete(&id)?;
            writeln!(out, "Deleted trip {}", trip.name)?;
        }
        TripCommand::Share { id } => {
            let trip = trips
                .get(&id)
                .with_context(|| format!("Trip not found: {}", id))?;
            writeln!(out, "{}", share_text(&trip))?;
        }
        TripCommand::AddDestination {
            trip,
            country,
            city,
            budget,
            days,
            notes,
        } => {
            let destination = trips
                .add_destination(
                    &trip,
                    NewDestination {
                        country,
                        city,
                        budget,
                        days,
                        notes,
                    },
                )
                .context("Could not add destination")?;
            writeln!(out, "Added {} ({})", destination.label(), destination.id)?;
        }
        TripCommand::RemoveDestination { trip, destination } => {
            trips.remove_destination(&trip, &destination)?;
            writeln!(out, "Removed destination {}", destination)?;
        }
    }
    Ok(())
}

fn write_trip(trip: &Trip, out: &mut dyn Write) -> Result<()> {
    writeln!(out, "{} ({})", trip.name, trip.id)?;
    writeln!(
        out,
        "  Dates:        {} to {} ({} days)",
        trip.start_date,
        trip.end_date,
        trip.duration_days()
    )?;
    writeln!(
        out,
        "  Budget:       {}",
        format_currency(trip.total_budget(), &trip.currency)
    )?;
    if !trip.description.is_empty() {
        writeln!(out, "  Description:  {}", trip.description)?;
    }
    if trip.destinations.is_empty() {
        writeln!(out, "  Destinations: Not specified")?;
        return Ok(());
    }

    writeln!(
        out,
        "  Destinations: {} ({} days planned)",
        trip.destinations.len(),
        trip.total_days()
    )?;
    for d in &trip.destinations {
        let per_day = d
            .per_day_budget()
            .map(|v| format!(", {}/day", format_currency(v, &trip.currency)))
            .unwrap_or_default();
        writeln!(
            out,
            "    {}  {}: {} for {} days{}",
            d.id,
            d.label(),
            format_currency(d.budget, &trip.currency),
            d.days,
            per_day
        )?;
        if !d.notes.is_empty() {
            writeln!(out, "      {}", d.notes)?;
        }
    }
    Ok(())
}
