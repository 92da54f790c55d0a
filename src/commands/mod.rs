//! Command implementations for the non-interactive subcommands
//!
//! Each submodule exposes an `execute` function that runs one command group
//! against the shared `Services` and writes its report to `out`.

pub mod currency;
pub mod destination;
pub mod expense;
pub mod trip;

use std::io::Write;

use anyhow::Result;

use crate::cli::Command;
use crate::converter::Converter;
use crate::data::TravelApi;
use crate::expenses::ExpenseTracker;
use crate::explorer::Explorer;
use crate::storage::Store;
use crate::trips::TripManager;

/// Provider client and store shared by every command
#[derive(Debug, Clone)]
pub struct Services {
    pub api: TravelApi,
    pub store: Store,
}

impl Services {
    pub fn new(api: TravelApi, store: Store) -> Self {
        Self { api, store }
    }

    pub fn converter(&self) -> Converter {
        Converter::new(self.api.clone(), self.store.clone())
    }

    pub fn trips(&self) -> TripManager {
        TripManager::new(self.store.clone())
    }

    pub fn expenses(&self) -> ExpenseTracker {
        ExpenseTracker::new(self.store.clone())
    }

    pub fn explorer(&self) -> Explorer {
        Explorer::new(self.api.clone())
    }
}

/// Runs a non-interactive command
///
/// `Command::Explore` is handled by the binary, which owns the terminal; it
/// is a no-op here.
pub async fn execute(command: Command, services: &Services, out: &mut dyn Write) -> Result<()> {
    match command {
        Command::Convert { amount, from, to } => {
            currency::convert(services, &amount, &from, &to, out).await
        }
        Command::Rates { base } => currency::rates(services, &base, out).await,
        Command::History { limit } => currency::history(services, limit, out),
        Command::RateHistory { base, target, days } => {
            currency::rate_history(services, &base, &target, days, out).await
        }
        Command::Favorite { action } => currency::favorite(services, action, out),
        Command::Currencies => currency::currencies(services, out).await,
        Command::Trip { action } => trip::execute(services, action, out),
        Command::Expense { action } => expense::execute(services, action, out),
        Command::Countries { region, search } => {
            destination::countries(services, region, &search, out).await
        }
        Command::Country { name } => destination::country(services, &name, out).await,
        Command::Explore { .. } => Ok(()),
    }
}
