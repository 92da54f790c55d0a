//! Command-line interface parsing for Trip Budget CLI
//!
//! This module handles parsing of CLI arguments using clap: the currency,
//! trip, expense and destination subcommands plus the global `--data-dir`,
//! `--config` and `--verbose` flags.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::config::Config;
use crate::data::rates::MAX_HISTORY_DAYS;
use crate::data::{ExpenseCategory, Region};
use crate::trips::MAX_DESTINATION_DAYS;
use crate::format;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The region name is not one the countries provider knows
    #[error("Invalid region: '{0}'. Valid regions: africa, americas, asia, europe, oceania")]
    InvalidRegion(String),

    /// The category name is not recognized
    #[error("Invalid category: '{0}'. Valid categories: accommodation, food, transport, activities, shopping, misc")]
    InvalidCategory(String),

    /// Not a three-letter currency code
    #[error("Invalid currency: '{0}'. Expected a three-letter code such as USD")]
    InvalidCurrency(String),
}

/// Trip Budget CLI - Plan trip budgets, convert currencies and explore destinations
#[derive(Parser, Debug)]
#[command(name = "tripbudget")]
#[command(about = "Trip budget planning, currency conversion and destination exploring")]
#[command(version)]
pub struct Cli {
    /// Directory where trips, expenses and preferences are stored
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Config file to load instead of the default location
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Convert an amount between currencies
    ///
    /// Examples:
    ///   tripbudget convert 100 USD EUR
    ///   tripbudget convert 2500 jpy gbp
    Convert {
        /// Amount to convert; anything that is not a non-negative number converts to 0
        #[arg(allow_hyphen_values = true)]
        amount: String,
        #[arg(value_parser = parse_currency_arg)]
        from: String,
        #[arg(value_parser = parse_currency_arg)]
        to: String,
    },

    /// Show exchange rates for a base currency
    Rates {
        #[arg(default_value = "USD", value_parser = parse_currency_arg)]
        base: String,
    },

    /// Show recent conversions, newest first
    History {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Show the daily rate trend between two currencies
    RateHistory {
        #[arg(value_parser = parse_currency_arg)]
        base: String,
        #[arg(value_parser = parse_currency_arg)]
        target: String,
        #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(0..=MAX_HISTORY_DAYS as i64))]
        days: u32,
    },

    /// Manage favorite currencies
    Favorite {
        #[command(subcommand)]
        action: FavoriteCommand,
    },

    /// List the currencies the rate provider offers
    Currencies,

    /// Plan trips and their destinations
    Trip {
        #[command(subcommand)]
        action: TripCommand,
    },

    /// Track expenses against a trip
    Expense {
        #[command(subcommand)]
        action: ExpenseCommand,
    },

    /// List countries, optionally by region and name
    Countries {
        #[arg(long, value_parser = parse_region_arg)]
        region: Option<Region>,
        #[arg(long, default_value = "")]
        search: String,
    },

    /// Show details and photos for a country
    Country { name: String },

    /// Browse destinations interactively
    Explore {
        #[arg(long, value_parser = parse_region_arg)]
        region: Option<Region>,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum FavoriteCommand {
    Add {
        #[arg(value_parser = parse_currency_arg)]
        code: String,
    },
    List,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum TripCommand {
    /// Create a trip
    Create {
        #[arg(long)]
        name: String,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: String,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: String,
        #[arg(long)]
        budget: f64,
        #[arg(long, default_value = "USD", value_parser = parse_currency_arg)]
        currency: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// List trips, optionally filtered by name
    List {
        #[arg(long)]
        search: Option<String>,
    },
    Show { id: String },
    Delete { id: String },
    /// Print a shareable summary
    Share { id: String },
    AddDestination {
        trip: String,
        #[arg(long)]
        country: String,
        #[arg(long, default_value = "")]
        city: String,
        #[arg(long)]
        budget: f64,
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=MAX_DESTINATION_DAYS as i64))]
        days: u32,
        #[arg(long, default_value = "")]
        notes: String,
    },
    RemoveDestination { trip: String, destination: String },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ExpenseCommand {
    Add {
        trip: String,
        #[arg(long)]
        amount: f64,
        #[arg(long, value_parser = parse_category_arg)]
        category: ExpenseCategory,
        #[arg(long, default_value = "")]
        description: String,
        /// Date of the expense (YYYY-MM-DD)
        #[arg(long)]
        date: String,
    },
    List { trip: String },
    Delete { id: String },
    /// Spending per category and remaining budget
    Summary { trip: String },
}

/// Parses a region argument into a Region.
///
/// # Arguments
/// * `s` - The region string from CLI
///
/// # Returns
/// * `Ok(Region)` if the string names a region
/// * `Err(CliError::InvalidRegion)` otherwise
pub fn parse_region_arg(s: &str) -> Result<Region, CliError> {
    Region::from_name(s).ok_or_else(|| CliError::InvalidRegion(s.to_string()))
}

pub fn parse_category_arg(s: &str) -> Result<ExpenseCategory, CliError> {
    ExpenseCategory::from_name(s).ok_or_else(|| CliError::InvalidCategory(s.to_string()))
}

/// Parses a currency code, accepting lowercase input
pub fn parse_currency_arg(s: &str) -> Result<String, CliError> {
    let code = s.trim().to_uppercase();
    if format::is_valid_currency(&code) {
        Ok(code)
    } else {
        Err(CliError::InvalidCurrency(s.to_string()))
    }
}

impl Cli {
    /// Applies flag overrides on top of the loaded configuration
    pub fn apply_overrides(&self, mut config: Config) -> Config {
        if let Some(dir) = &self.data_dir {
            config.data_dir = Some(dir.clone());
        }
        config
    }

    /// Default log filter for the chosen verbosity
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "tripbudget=debug"
        } else {
            "tripbudget=warn"
        }
    }
}
