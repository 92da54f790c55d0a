//! Exchange-rate provider types
//!
//! Typed view of the exchange-rate API response, plus the mocked historical
//! rate series derived from the current rate.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Maximum relative deviation of a mocked historical rate from the current rate
const HISTORY_VARIANCE: f64 = 0.1;

/// Longest mocked history, in days; longer requests are truncated to it
pub const MAX_HISTORY_DAYS: u32 = 3650;

/// Exchange rates for one base currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRates {
    /// Base currency code (e.g. "USD")
    pub base: String,
    /// Date the rates were published, as reported by the provider
    #[serde(default)]
    pub date: Option<String>,
    /// Units of each currency per one unit of the base currency
    pub rates: BTreeMap<String, f64>,
}

impl ExchangeRates {
    /// Returns the rate from the base currency to `code`, if listed
    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied()
    }

    /// Currency codes listed by the provider, sorted
    pub fn currencies(&self) -> Vec<String> {
        self.rates.keys().cloned().collect()
    }
}

/// One day of a historical exchange-rate series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatePoint {
    pub date: NaiveDate,
    pub rate: f64,
}

/// Builds a mocked series of `days + 1` points ending at `today`
///
/// Each point is `current_rate` with up to ±5% random variance, oldest first.
/// `days` is capped at [`MAX_HISTORY_DAYS`]; days that fall before the
/// earliest representable date are skipped.
pub fn mock_history<R: Rng>(
    current_rate: f64,
    days: u32,
    today: NaiveDate,
    rng: &mut R,
) -> Vec<RatePoint> {
    (0..=days.min(MAX_HISTORY_DAYS))
        .rev()
        .filter_map(|days_ago| today.checked_sub_signed(Duration::days(i64::from(days_ago))))
        .map(|date| {
            let variance = (rng.gen::<f64>() - 0.5) * HISTORY_VARIANCE;
            RatePoint {
                date,
                rate: current_rate * (1.0 + variance),
            }
        })
        .collect()
}
