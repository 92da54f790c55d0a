//! Core data models for the trip budget CLI
//!
//! This module contains the persisted record types (trips, destinations,
//! expenses, conversion history, preferences) and the provider clients used to
//! reach the exchange-rate, country-metadata and photo-search APIs.

pub mod api;
pub mod countries;
pub mod http;
pub mod photos;
pub mod rates;

pub use api::TravelApi;
pub use countries::{Country, Region};
pub use http::{FetchError, HttpFetcher};
pub use photos::Photo;
pub use rates::{ExchangeRates, RatePoint};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A planned trip with its overall budget and destinations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: String,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Overall budget, used when no destination carries a budget
    pub budget: f64,
    /// Currency code all amounts of this trip are expressed in
    pub currency: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub destinations: Vec<Destination>,
    pub created_at: DateTime<Utc>,
}

impl Trip {
    /// Sum of destination budgets when positive, otherwise the trip budget
    pub fn total_budget(&self) -> f64 {
        let destinations: f64 = self.destinations.iter().map(|d| d.budget).sum();
        if destinations > 0.0 {
            destinations
        } else {
            self.budget
        }
    }

    /// Whole days between start and end date
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }

    /// Sum of the days planned at each destination
    pub fn total_days(&self) -> u64 {
        self.destinations.iter().map(|d| u64::from(d.days)).sum()
    }

    /// "France (Paris), Italy" or "Not specified"
    pub fn destination_summary(&self) -> String {
        if self.destinations.is_empty() {
            return "Not specified".to_string();
        }
        self.destinations
            .iter()
            .map(Destination::label)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A stop on a trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub id: String,
    pub country: String,
    #[serde(default)]
    pub city: String,
    pub budget: f64,
    pub days: u32,
    #[serde(default)]
    pub notes: String,
}

impl Destination {
    /// Budget per planned day, if any days are planned
    pub fn per_day_budget(&self) -> Option<f64> {
        (self.days > 0).then(|| self.budget / f64::from(self.days))
    }

    /// "Country (City)" or just "Country"
    pub fn label(&self) -> String {
        if self.city.trim().is_empty() {
            self.country.clone()
        } else {
            format!("{} ({})", self.country, self.city)
        }
    }
}

/// Expense categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseCategory {
    Accommodation,
    Food,
    Transport,
    Activities,
    Shopping,
    Misc,
}

impl ExpenseCategory {
    /// Returns a slice containing all category variants, in display order.
    pub fn all() -> &'static [ExpenseCategory] {
        &[
            ExpenseCategory::Accommodation,
            ExpenseCategory::Food,
            ExpenseCategory::Transport,
            ExpenseCategory::Activities,
            ExpenseCategory::Shopping,
            ExpenseCategory::Misc,
        ]
    }

    /// Identifier as stored on disk
    pub fn id(&self) -> &'static str {
        match self {
            ExpenseCategory::Accommodation => "accommodation",
            ExpenseCategory::Food => "food",
            ExpenseCategory::Transport => "transport",
            ExpenseCategory::Activities => "activities",
            ExpenseCategory::Shopping => "shopping",
            ExpenseCategory::Misc => "misc",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExpenseCategory::Accommodation => "Accommodation",
            ExpenseCategory::Food => "Food & Dining",
            ExpenseCategory::Transport => "Transportation",
            ExpenseCategory::Activities => "Activities",
            ExpenseCategory::Shopping => "Shopping",
            ExpenseCategory::Misc => "Miscellaneous",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            ExpenseCategory::Accommodation => "🏨",
            ExpenseCategory::Food => "🍽️",
            ExpenseCategory::Transport => "✈️",
            ExpenseCategory::Activities => "🎭",
            ExpenseCategory::Shopping => "🛍️",
            ExpenseCategory::Misc => "📦",
        }
    }

    /// Parses user input into a category.
    ///
    /// Matching is case-insensitive and accepts a few aliases.
    pub fn from_name(s: &str) -> Option<ExpenseCategory> {
        match s.trim().to_lowercase().as_str() {
            "accommodation" | "hotel" | "lodging" => Some(ExpenseCategory::Accommodation),
            "food" | "dining" => Some(ExpenseCategory::Food),
            "transport" | "transportation" | "travel" => Some(ExpenseCategory::Transport),
            "activities" | "activity" => Some(ExpenseCategory::Activities),
            "shopping" => Some(ExpenseCategory::Shopping),
            "misc" | "miscellaneous" | "other" => Some(ExpenseCategory::Misc),
            _ => None,
        }
    }
}

/// A single logged expense against a trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub trip_id: String,
    pub amount: f64,
    pub category: ExpenseCategory,
    #[serde(default)]
    pub description: String,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// One completed currency conversion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionRecord {
    /// Milliseconds since the epoch when the conversion happened
    pub id: i64,
    pub from_amount: f64,
    pub from_currency: String,
    pub to_amount: f64,
    pub to_currency: String,
    pub rate: f64,
    pub timestamp: DateTime<Utc>,
}

/// Last used converter currency pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub from_currency: String,
    pub to_currency: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            from_currency: "USD".to_string(),
            to_currency: "EUR".to_string(),
        }
    }
}
