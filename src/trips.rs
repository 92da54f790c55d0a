//! Trip planning
//!
//! Creates, searches and edits trips and their destinations. Trips persist
//! under `tbc_trips`; deleting a trip also deletes its expenses.

use chrono::Utc;
use thiserror::Error;
use tracing::info;

use crate::data::{Destination, Expense, Trip};
use crate::format::{self, format_currency};
use crate::storage::{keys, Store, StoreError};

/// Longest stay accepted at a single destination, in days
pub const MAX_DESTINATION_DAYS: u32 = 3650;

/// Errors that can occur when planning trips
#[derive(Debug, Error)]
pub enum TripError {
    #[error("Trip name must not be empty")]
    EmptyName,

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("End date must not be before start date")]
    EndBeforeStart,

    #[error("Budget must be a non-negative amount")]
    InvalidBudget,

    #[error("Invalid currency code '{0}', expected three uppercase letters")]
    InvalidCurrency(String),

    #[error("Destination country must not be empty")]
    EmptyCountry,

    #[error("Days at a destination must be between 1 and {}", MAX_DESTINATION_DAYS)]
    InvalidDays,

    #[error("Trip not found: {0}")]
    NotFound(String),

    #[error("Destination not found: {0}")]
    DestinationNotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Input for a new trip, as entered by the user
#[derive(Debug, Clone, Default)]
pub struct NewTrip {
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    pub budget: f64,
    pub currency: String,
    pub description: String,
}

/// Input for a new destination on an existing trip
#[derive(Debug, Clone, Default)]
pub struct NewDestination {
    pub country: String,
    pub city: String,
    pub budget: f64,
    pub days: u32,
    pub notes: String,
}

/// Manages the persisted list of trips
#[derive(Debug, Clone)]
pub struct TripManager {
    store: Store,
}

impl TripManager {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// All trips, in creation order
    pub fn list(&self) -> Vec<Trip> {
        self.store.get_or_default(keys::TRIPS)
    }

    /// Trips whose name contains `text`, case-insensitively
    pub fn search(&self, text: &str) -> Vec<Trip> {
        let needle = text.trim().to_lowercase();
        self.list()
            .into_iter()
            .filter(|trip| trip.name.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<Trip> {
        self.list().into_iter().find(|trip| trip.id == id)
    }

    fn save(&self, trips: &[Trip]) -> Result<(), TripError> {
        self.store.set(keys::TRIPS, trips)?;
        Ok(())
    }

    /// Validates and stores a new trip
    ///
    /// # Arguments
    /// * `input` - The trip as entered; dates are `YYYY-MM-DD`
    ///
    /// # Returns
    /// The stored trip, with a fresh id and no destinations
    pub fn create(&self, input: NewTrip) -> Result<Trip, TripError> {
        let name = input.name.trim();
        if !format::is_not_empty(name) {
            return Err(TripError::EmptyName);
        }
        let start_date = format::parse_date(&input.start_date)
            .ok_or_else(|| TripError::InvalidDate(input.start_date.clone()))?;
        let end_date = format::parse_date(&input.end_date)
            .ok_or_else(|| TripError::InvalidDate(input.end_date.clone()))?;
        if end_date < start_date {
            return Err(TripError::EndBeforeStart);
        }
        if !format::is_valid_amount(input.budget) {
            return Err(TripError::InvalidBudget);
        }
        if !format::is_valid_currency(&input.currency) {
            return Err(TripError::InvalidCurrency(input.currency));
        }

        let trip = Trip {
            id: format::generate_id(),
            name: name.to_string(),
            start_date,
            end_date,
            budget: input.budget,
            currency: input.currency,
            description: input.description.trim().to_string(),
            destinations: Vec::new(),
            created_at: Utc::now(),
        };

        let mut trips = self.list();
        trips.push(trip.clone());
        self.save(&trips)?;
        info!(id = %trip.id, name = %trip.name, "trip created");
        Ok(trip)
    }

    /// Deletes a trip and every expense logged against it
    pub fn delete(&self, id: &str) -> Result<Trip, TripError> {
        let mut trips = self.list();
        let index = trips
            .iter()
            .position(|trip| trip.id == id)
            .ok_or_else(|| TripError::NotFound(id.to_string()))?;
        let removed = trips.remove(index);
        self.save(&trips)?;

        let expenses: Vec<Expense> = self.store.get_or_default(keys::EXPENSES);
        let before = expenses.len();
        let kept: Vec<Expense> = expenses.into_iter().filter(|e| e.trip_id != id).collect();
        if kept.len() != before {
            self.store.set(keys::EXPENSES, &kept)?;
        }

        info!(id, expenses_removed = before - kept.len(), "trip deleted");
        Ok(removed)
    }

    /// Adds a destination to an existing trip
    pub fn add_destination(
        &self,
        trip_id: &str,
        input: NewDestination,
    ) -> Result<Destination, TripError> {
        let country = input.country.trim();
        if !format::is_not_empty(country) {
            return Err(TripError::EmptyCountry);
        }
        if !format::is_valid_amount(input.budget) {
            return Err(TripError::InvalidBudget);
        }
        if !(1..=MAX_DESTINATION_DAYS).contains(&input.days) {
            return Err(TripError::InvalidDays);
        }

        let mut trips = self.list();
        let trip = trips
            .iter_mut()
            .find(|trip| trip.id == trip_id)
            .ok_or_else(|| TripError::NotFound(trip_id.to_string()))?;

        let destination = Destination {
            id: format::generate_id(),
            country: country.to_string(),
            city: input.city.trim().to_string(),
            budget: input.budget,
            days: input.days,
            notes: input.notes.trim().to_string(),
        };
        trip.destinations.push(destination.clone());
        self.save(&trips)?;
        info!(trip_id, destination = %destination.label(), "destination added");
        Ok(destination)
    }

    pub fn remove_destination(&self, trip_id: &str, destination_id: &str) -> Result<(), TripError> {
        let mut trips = self.list();
        let trip = trips
            .iter_mut()
            .find(|trip| trip.id == trip_id)
            .ok_or_else(|| TripError::NotFound(trip_id.to_string()))?;

        let before = trip.destinations.len();
        trip.destinations.retain(|d| d.id != destination_id);
        if trip.destinations.len() == before {
            return Err(TripError::DestinationNotFound(destination_id.to_string()));
        }
        self.save(&trips)?;
        info!(trip_id, destination_id, "destination removed");
        Ok(())
    }
}

/// Plain-text trip summary suitable for sharing
pub fn share_text(trip: &Trip) -> String {
    let mut lines = vec![
        format!("🌍 {}", trip.name),
        format!(
            "📅 {} to {}",
            trip.start_date.format(format::DATE_FORMAT),
            trip.end_date.format(format::DATE_FORMAT)
        ),
        format!(
            "💰 Total Budget: {}",
            format_currency(trip.total_budget(), &trip.currency)
        ),
        format!("📍 {} Destination(s)", trip.destinations.len()),
    ];

    if !trip.destinations.is_empty() {
        lines.push(String::new());
        lines.push("🗺️ Destinations:".to_string());
        for d in &trip.destinations {
            lines.push(format!(
                "  • {}: {} for {} days",
                d.label(),
                format_currency(d.budget, &trip.currency),
                d.days
            ));
        }
    }

    if !trip.description.is_empty() {
        lines.push(String::new());
        lines.push(format!("📝 {}", trip.description));
    }

    lines.push(String::new());
    lines.push("Created with Trip Budget CLI".to_string());
    lines.join("\n")
}
