//! Currency conversion
//!
//! Converts amounts through the cached exchange-rate provider and keeps the
//! user's conversion history, last used currency pair and favorite currencies.

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info};

use crate::data::{ConversionRecord, FetchError, Preferences, TravelApi};
use crate::format;
use crate::storage::{keys, Store, StoreError};

/// Maximum number of conversions kept in the history
pub const HISTORY_LIMIT: usize = 10;

/// Base currency whose rate table lists the available currencies
const REFERENCE_CURRENCY: &str = "USD";

/// Errors that can occur when converting currencies
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("No exchange rate from {from} to {to}")]
    RateNotFound { from: String, to: String },

    #[error("Invalid currency code '{0}', expected three uppercase letters")]
    InvalidCurrency(String),

    #[error("Failed to fetch exchange rates: {0}")]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result of a single conversion
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub from_amount: f64,
    pub from_currency: String,
    pub to_amount: f64,
    pub to_currency: String,
    /// Rate used; `None` when no rate was needed (invalid amount)
    pub rate: Option<f64>,
}

impl Conversion {
    /// "100.00 USD = 91.00 EUR"
    pub fn summary(&self) -> String {
        format!(
            "{:.2} {} = {:.2} {}",
            self.from_amount, self.from_currency, self.to_amount, self.to_currency
        )
    }
}

/// Currency converter backed by the shared provider client
#[derive(Debug, Clone)]
pub struct Converter {
    api: TravelApi,
    store: Store,
}

impl Converter {
    pub fn new(api: TravelApi, store: Store) -> Self {
        Self { api, store }
    }

    /// Converts `amount` from one currency to another
    ///
    /// A negative or non-finite amount converts to 0 without a lookup, and a
    /// same-currency conversion is the identity. Every cross-currency
    /// conversion is recorded in the history and remembered as the preferred
    /// currency pair.
    ///
    /// # Arguments
    /// * `amount` - Amount in `from` currency
    /// * `from` - Source currency code
    /// * `to` - Target currency code
    pub async fn convert(&self, amount: f64, from: &str, to: &str) -> Result<Conversion, ConvertError> {
        if !format::is_valid_amount(amount) {
            return Ok(Conversion {
                from_amount: amount,
                from_currency: from.to_string(),
                to_amount: 0.0,
                to_currency: to.to_string(),
                rate: None,
            });
        }
        if from == to {
            return Ok(Conversion {
                from_amount: amount,
                from_currency: from.to_string(),
                to_amount: amount,
                to_currency: to.to_string(),
                rate: Some(1.0),
            });
        }

        let rate = self.rate(from, to).await?;
        let conversion = Conversion {
            from_amount: amount,
            from_currency: from.to_string(),
            to_amount: amount * rate,
            to_currency: to.to_string(),
            rate: Some(rate),
        };
        debug!(summary = %conversion.summary(), rate, "converted");

        self.record(&conversion, rate)?;
        self.save_preferences(&Preferences {
            from_currency: from.to_string(),
            to_currency: to.to_string(),
        })?;
        Ok(conversion)
    }

    async fn rate(&self, from: &str, to: &str) -> Result<f64, ConvertError> {
        let rates = self.api.exchange_rates(from).await?;
        rates.rate(to).ok_or_else(|| ConvertError::RateNotFound {
            from: from.to_string(),
            to: to.to_string(),
        })
    }

    /// "1 USD = 0.9100 EUR"
    pub async fn rate_info(&self, from: &str, to: &str) -> Result<String, ConvertError> {
        if from == to {
            return Ok(format!("1 {} = 1.00 {}", from, to));
        }
        let rate = self.rate(from, to).await?;
        Ok(format!("1 {} = {:.4} {}", from, rate, to))
    }

    /// Currency codes offered by the provider
    pub async fn available_currencies(&self) -> Result<Vec<String>, ConvertError> {
        let rates = self.api.exchange_rates(REFERENCE_CURRENCY).await?;
        Ok(rates.currencies())
    }

    /// Conversions, newest first
    pub fn history(&self) -> Vec<ConversionRecord> {
        self.store.get_or_default(keys::CONVERSION_HISTORY)
    }

    fn record(&self, conversion: &Conversion, rate: f64) -> Result<(), ConvertError> {
        let now = Utc::now();
        let mut history = self.history();
        history.insert(
            0,
            ConversionRecord {
                id: now.timestamp_millis(),
                from_amount: conversion.from_amount,
                from_currency: conversion.from_currency.clone(),
                to_amount: conversion.to_amount,
                to_currency: conversion.to_currency.clone(),
                rate,
                timestamp: now,
            },
        );
        history.truncate(HISTORY_LIMIT);
        self.store.set(keys::CONVERSION_HISTORY, &history)?;
        Ok(())
    }

    /// Last used currency pair, or USD to EUR
    pub fn preferences(&self) -> Preferences {
        self.store.get_or_default(keys::PREFERENCES)
    }

    pub fn save_preferences(&self, prefs: &Preferences) -> Result<(), ConvertError> {
        self.store.set(keys::PREFERENCES, prefs)?;
        Ok(())
    }

    /// Swaps the preferred pair and stores the result
    pub fn swap(&self) -> Result<Preferences, ConvertError> {
        let prefs = swapped(&self.preferences());
        self.save_preferences(&prefs)?;
        Ok(prefs)
    }

    pub fn favorites(&self) -> Vec<String> {
        self.store.get_or_default(keys::FAVORITE_CURRENCIES)
    }

    /// Adds a favorite currency
    ///
    /// Returns `false` if it was already a favorite.
    pub fn add_favorite(&self, code: &str) -> Result<bool, ConvertError> {
        let code = code.trim().to_uppercase();
        if !format::is_valid_currency(&code) {
            return Err(ConvertError::InvalidCurrency(code));
        }
        let mut favorites = self.favorites();
        if favorites.contains(&code) {
            return Ok(false);
        }
        favorites.push(code.clone());
        self.store.set(keys::FAVORITE_CURRENCIES, &favorites)?;
        info!(code = %code, "favorite currency added");
        Ok(true)
    }
}

/// The same pair with source and target exchanged
pub fn swapped(prefs: &Preferences) -> Preferences {
    Preferences {
        from_currency: prefs.to_currency.clone(),
        to_currency: prefs.from_currency.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use mockito::{Matcher, Server, ServerGuard};
    use tempfile::TempDir;

    const USD_RATES: &str = r#"{"base": "USD", "rates": {"USD": 1, "EUR": 0.91, "GBP": 0.79, "JPY": 151.2}}"#;

    fn converter_for(server: &Server) -> (Converter, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = Config {
            rates_url: server.url(),
            timeout_secs: 1,
            ..Config::default()
        };
        let converter = Converter::new(
            TravelApi::new(&config),
            Store::with_dir(temp_dir.path().to_path_buf()),
        );
        (converter, temp_dir)
    }

    async fn usd_server(expected_calls: usize) -> (ServerGuard, mockito::Mock) {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/USD")
            .with_status(200)
            .with_body(USD_RATES)
            .expect(expected_calls)
            .create_async()
            .await;
        (server, mock)
    }

    #[tokio::test]
    async fn test_convert_records_history_and_preferences() {
        let (server, mock) = usd_server(1).await;
        let (converter, _temp_dir) = converter_for(&server);

        let result = converter.convert(100.0, "USD", "EUR").await.unwrap();

        assert!((result.to_amount - 91.0).abs() < 1e-9);
        assert_eq!(result.rate, Some(0.91));
        assert_eq!(result.summary(), "100.00 USD = 91.00 EUR");

        let history = converter.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].from_currency, "USD");
        assert_eq!(history[0].to_currency, "EUR");
        assert_eq!(
            converter.preferences(),
            Preferences {
                from_currency: "USD".to_string(),
                to_currency: "EUR".to_string(),
            }
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_repeat_conversions_reuse_cached_rates() {
        let (server, mock) = usd_server(1).await;
        let (converter, _temp_dir) = converter_for(&server);

        converter.convert(1.0, "USD", "EUR").await.unwrap();
        converter.convert(2.0, "USD", "GBP").await.unwrap();
        converter.rate_info("USD", "JPY").await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_invalid_amount_and_identity_skip_lookup() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;
        let (converter, _temp_dir) = converter_for(&server);

        let negative = converter.convert(-5.0, "USD", "EUR").await.unwrap();
        let identity = converter.convert(42.0, "EUR", "EUR").await.unwrap();

        assert_eq!(negative.to_amount, 0.0);
        assert_eq!(negative.rate, None);
        assert_eq!(identity.to_amount, 42.0);
        assert!(converter.history().is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_rate_is_an_error() {
        let (server, _mock) = usd_server(1).await;
        let (converter, _temp_dir) = converter_for(&server);

        let err = converter.convert(1.0, "USD", "XYZ").await.unwrap_err();

        assert!(matches!(err, ConvertError::RateNotFound { .. }));
        assert!(converter.history().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_surfaces() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/USD")
            .with_status(503)
            .create_async()
            .await;
        let (converter, _temp_dir) = converter_for(&server);

        let err = converter.convert(1.0, "USD", "EUR").await.unwrap_err();

        assert!(matches!(err, ConvertError::Fetch(FetchError::Status(503))));
    }

    #[tokio::test]
    async fn test_history_keeps_newest_ten() {
        let (server, _mock) = usd_server(1).await;
        let (converter, _temp_dir) = converter_for(&server);

        for amount in 1..=12 {
            converter.convert(f64::from(amount), "USD", "EUR").await.unwrap();
        }

        let history = converter.history();
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history[0].from_amount, 12.0);
        assert_eq!(history[9].from_amount, 3.0);
    }

    #[tokio::test]
    async fn test_rate_info_formatting() {
        let (server, _mock) = usd_server(1).await;
        let (converter, _temp_dir) = converter_for(&server);

        assert_eq!(converter.rate_info("USD", "EUR").await.unwrap(), "1 USD = 0.9100 EUR");
        assert_eq!(converter.rate_info("GBP", "GBP").await.unwrap(), "1 GBP = 1.00 GBP");
    }

    #[tokio::test]
    async fn test_available_currencies_from_usd_table() {
        let (server, _mock) = usd_server(1).await;
        let (converter, _temp_dir) = converter_for(&server);

        let currencies = converter.available_currencies().await.unwrap();

        assert_eq!(currencies, vec!["EUR", "GBP", "JPY", "USD"]);
    }

    #[test]
    fn test_swap_and_favorites() {
        let temp_dir = TempDir::new().unwrap();
        let converter = Converter::new(
            TravelApi::new(&Config::default()),
            Store::with_dir(temp_dir.path().to_path_buf()),
        );

        let prefs = converter.swap().unwrap();
        assert_eq!(prefs.from_currency, "EUR");
        assert_eq!(converter.preferences(), prefs);

        assert!(converter.add_favorite("jpy").unwrap());
        assert!(!converter.add_favorite("JPY").unwrap());
        assert!(matches!(
            converter.add_favorite("EURO"),
            Err(ConvertError::InvalidCurrency(_))
        ));
        assert_eq!(converter.favorites(), vec!["JPY"]);
    }
}
