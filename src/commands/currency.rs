//! Currency commands: convert, rates, history, rate trend, favorites

use std::io::Write;

use anyhow::{Context, Result};

use super::Services;
use crate::cli::FavoriteCommand;
use crate::format::{self, format_currency};

pub async fn convert(
    services: &Services,
    amount: &str,
    from: &str,
    to: &str,
    out: &mut dyn Write,
) -> Result<()> {
    let converter = services.converter();
    let conversion = converter
        .convert(format::parse_number(amount), from, to)
        .await
        .context("Conversion failed")?;

    writeln!(out, "{}", conversion.summary())?;
    if conversion.rate.is_some() && from != to {
        writeln!(out, "{}", converter.rate_info(from, to).await?)?;
    }
    Ok(())
}

pub async fn rates(services: &Services, base: &str, out: &mut dyn Write) -> Result<()> {
    let rates = services
        .api
        .exchange_rates(base)
        .await
        .with_context(|| format!("Failed to fetch rates for {}", base))?;

    match &rates.date {
        Some(date) => writeln!(out, "Exchange rates for 1 {} ({})", rates.base, date)?,
        None => writeln!(out, "Exchange rates for 1 {}", rates.base)?,
    }
    for (code, rate) in &rates.rates {
        writeln!(out, "  {:<4} {:>14.4}", code, rate)?;
    }
    Ok(())
}

pub fn history(services: &Services, limit: usize, out: &mut dyn Write) -> Result<()> {
    let history = services.converter().history();
    if history.is_empty() {
        writeln!(out, "No conversions yet")?;
        return Ok(());
    }
    for record in history.iter().take(limit) {
        writeln!(
            out,
            "{}  {} = {}  (rate {:.4})",
            record.timestamp.format("%Y-%m-%d %H:%M"),
            format_currency(record.from_amount, &record.from_currency),
            format_currency(record.to_amount, &record.to_currency),
            record.rate
        )?;
    }
    Ok(())
}

pub async fn rate_history(
    services: &Services,
    base: &str,
    target: &str,
    days: u32,
    out: &mut dyn Write,
) -> Result<()> {
    let points = services
        .api
        .rate_history(base, target, days)
        .await
        .with_context(|| format!("Failed to build rate history for {}/{}", base, target))?;

    writeln!(out, "{}/{} over the last {} days (simulated)", base, target, days)?;
    for point in points.iter() {
        writeln!(out, "  {}  {:.4}", point.date.format(format::DATE_FORMAT), point.rate)?;
    }
    Ok(())
}

pub fn favorite(services: &Services, action: FavoriteCommand, out: &mut dyn Write) -> Result<()> {
    let converter = services.converter();
    match action {
        FavoriteCommand::Add { code } => {
            if converter.add_favorite(&code)? {
                writeln!(out, "Added {} to favorites", code)?;
            } else {
                writeln!(out, "{} is already a favorite", code)?;
            }
        }
        FavoriteCommand::List => {
            let favorites = converter.favorites();
            if favorites.is_empty() {
                writeln!(out, "No favorite currencies")?;
            } else {
                writeln!(out, "{}", favorites.join(", "))?;
            }
        }
    }
    Ok(())
}

pub async fn currencies(services: &Services, out: &mut dyn Write) -> Result<()> {
    let currencies = services
        .converter()
        .available_currencies()
        .await
        .context("Failed to fetch currency list")?;
    for chunk in currencies.chunks(10) {
        writeln!(out, "{}", chunk.join(" "))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Command;
    use crate::commands::execute;
    use crate::config::Config;
    use crate::data::TravelApi;
    use crate::storage::Store;
    use mockito::{Server, ServerGuard};
    use tempfile::TempDir;

    const USD_RATES: &str =
        r#"{"base": "USD", "date": "2025-06-01", "rates": {"USD": 1, "EUR": 0.91, "GBP": 0.79}}"#;

    async fn setup() -> (Services, ServerGuard, TempDir) {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/USD")
            .with_status(200)
            .with_body(USD_RATES)
            .create_async()
            .await;
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            rates_url: server.url(),
            ..Config::default()
        };
        let services = Services::new(
            TravelApi::new(&config),
            Store::with_dir(temp_dir.path().to_path_buf()),
        );
        (services, server, temp_dir)
    }

    async fn run(services: &Services, command: Command) -> String {
        let mut out = Vec::new();
        execute(command, services, &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn test_convert_then_history() {
        let (services, _server, _temp_dir) = setup().await;

        let output = run(
            &services,
            Command::Convert {
                amount: "100".to_string(),
                from: "USD".to_string(),
                to: "EUR".to_string(),
            },
        )
        .await;
        assert!(output.contains("100.00 USD = 91.00 EUR"));
        assert!(output.contains("1 USD = 0.9100 EUR"));

        let output = run(&services, Command::History { limit: 10 }).await;
        assert!(output.contains("$100.00 = €91.00"));
    }

    #[tokio::test]
    async fn test_invalid_amount_converts_to_zero() {
        let (services, _server, _temp_dir) = setup().await;

        let output = run(
            &services,
            Command::Convert {
                amount: "abc".to_string(),
                from: "USD".to_string(),
                to: "EUR".to_string(),
            },
        )
        .await;

        assert!(output.contains("0.00 USD = 0.00 EUR"));
    }

    #[tokio::test]
    async fn test_rates_and_currencies() {
        let (services, _server, _temp_dir) = setup().await;

        let output = run(&services, Command::Rates { base: "USD".to_string() }).await;
        assert!(output.contains("Exchange rates for 1 USD (2025-06-01)"));
        assert!(output.contains("EUR"));

        let output = run(&services, Command::Currencies).await;
        assert_eq!(output.trim(), "EUR GBP USD");
    }

    #[tokio::test]
    async fn test_history_empty() {
        let (services, _server, _temp_dir) = setup().await;
        let output = run(&services, Command::History { limit: 5 }).await;
        assert_eq!(output.trim(), "No conversions yet");
    }

    #[tokio::test]
    async fn test_rate_history_lists_each_day() {
        let (services, _server, _temp_dir) = setup().await;

        let output = run(
            &services,
            Command::RateHistory {
                base: "USD".to_string(),
                target: "EUR".to_string(),
                days: 3,
            },
        )
        .await;

        assert!(output.starts_with("USD/EUR over the last 3 days"));
        assert_eq!(output.lines().count(), 5);
    }

    #[tokio::test]
    async fn test_favorites() {
        let (services, _server, _temp_dir) = setup().await;
        let add = || Command::Favorite {
            action: FavoriteCommand::Add { code: "JPY".to_string() },
        };

        assert!(run(&services, add()).await.contains("Added JPY"));
        assert!(run(&services, add()).await.contains("already a favorite"));
        let output = run(&services, Command::Favorite { action: FavoriteCommand::List }).await;
        assert_eq!(output.trim(), "JPY");
    }
}
