//! Expense tracking
//!
//! Logs expenses against stored trips and summarizes them per category.
//! Expenses persist under `tbc_expenses`.

use chrono::Utc;
use thiserror::Error;
use tracing::info;

use crate::data::{Expense, ExpenseCategory, Trip};
use crate::format;
use crate::storage::{keys, Store, StoreError};

/// Errors that can occur when logging expenses
#[derive(Debug, Error)]
pub enum ExpenseError {
    #[error("Trip not found: {0}")]
    TripNotFound(String),

    #[error("Amount must be a non-negative number")]
    InvalidAmount,

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Expense not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Input for a new expense
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub trip_id: String,
    pub amount: f64,
    pub category: ExpenseCategory,
    pub description: String,
    pub date: String,
}

/// Total spent in one category
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: ExpenseCategory,
    pub amount: f64,
    /// Share of all expenses of the trip, 0-100
    pub percentage: f64,
}

/// Per-category spending of a trip
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Breakdown {
    /// Categories with at least one expense, in category order
    pub categories: Vec<CategoryTotal>,
    pub total: f64,
    pub count: usize,
}

/// Manages the persisted list of expenses
#[derive(Debug, Clone)]
pub struct ExpenseTracker {
    store: Store,
}

impl ExpenseTracker {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    fn all(&self) -> Vec<Expense> {
        self.store.get_or_default(keys::EXPENSES)
    }

    fn save(&self, expenses: &[Expense]) -> Result<(), ExpenseError> {
        self.store.set(keys::EXPENSES, expenses)?;
        Ok(())
    }

    /// Logs an expense against an existing trip
    pub fn add(&self, input: NewExpense) -> Result<Expense, ExpenseError> {
        let trips: Vec<Trip> = self.store.get_or_default(keys::TRIPS);
        if !trips.iter().any(|trip| trip.id == input.trip_id) {
            return Err(ExpenseError::TripNotFound(input.trip_id));
        }
        if !format::is_valid_amount(input.amount) {
            return Err(ExpenseError::InvalidAmount);
        }
        let date =
            format::parse_date(&input.date).ok_or(ExpenseError::InvalidDate(input.date))?;

        let expense = Expense {
            id: format::generate_id(),
            trip_id: input.trip_id,
            amount: input.amount,
            category: input.category,
            description: input.description.trim().to_string(),
            date,
            created_at: Utc::now(),
        };

        let mut expenses = self.all();
        expenses.push(expense.clone());
        self.save(&expenses)?;
        info!(id = %expense.id, trip_id = %expense.trip_id, amount = expense.amount, "expense added");
        Ok(expense)
    }

    /// Expenses of one trip, in the order they were logged
    pub fn for_trip(&self, trip_id: &str) -> Vec<Expense> {
        self.all()
            .into_iter()
            .filter(|expense| expense.trip_id == trip_id)
            .collect()
    }

    pub fn delete(&self, id: &str) -> Result<Expense, ExpenseError> {
        let mut expenses = self.all();
        let index = expenses
            .iter()
            .position(|expense| expense.id == id)
            .ok_or_else(|| ExpenseError::NotFound(id.to_string()))?;
        let removed = expenses.remove(index);
        self.save(&expenses)?;
        info!(id, "expense deleted");
        Ok(removed)
    }

    /// Per-category totals of a trip's expenses
    pub fn breakdown(&self, trip_id: &str) -> Breakdown {
        summarize(&self.for_trip(trip_id))
    }

    /// Budget left after the trip's expenses; negative when over budget
    pub fn remaining_budget(&self, trip: &Trip) -> f64 {
        trip.total_budget() - self.breakdown(&trip.id).total
    }
}

/// Groups expenses by category with each category's share of the total
pub fn summarize(expenses: &[Expense]) -> Breakdown {
    let total: f64 = expenses.iter().map(|e| e.amount).sum();
    let categories = ExpenseCategory::all()
        .iter()
        .filter_map(|category| {
            let mut in_category = expenses.iter().filter(|e| e.category == *category).peekable();
            in_category.peek()?;
            let amount: f64 = in_category.map(|e| e.amount).sum();
            let percentage = if total > 0.0 { amount / total * 100.0 } else { 0.0 };
            Some(CategoryTotal {
                category: *category,
                amount,
                percentage,
            })
        })
        .collect();

    Breakdown {
        categories,
        total,
        count: expenses.len(),
    }
}
