//! Formatting, parsing and validation helpers shared by the controllers

use chrono::NaiveDate;

/// Date format used for trip and expense dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Formats an amount with its currency, e.g. "$1,234.50" or "1,234.50 CHF"
pub fn format_currency(value: f64, currency: &str) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let amount = group_thousands(value.abs());
    match currency_symbol(currency) {
        Some(symbol) => format!("{}{}{}", sign, symbol, amount),
        None => format!("{}{} {}", sign, amount, currency),
    }
}

fn currency_symbol(currency: &str) -> Option<&'static str> {
    match currency {
        "USD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        "JPY" => Some("¥"),
        "INR" => Some("₹"),
        "KRW" => Some("₩"),
        _ => None,
    }
}

/// Two decimals with comma thousands separators
fn group_thousands(value: f64) -> String {
    let fixed = format!("{:.2}", value);
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    format!("{}.{}", grouped, fraction)
}

/// Formats a `YYYY-MM-DD` date as "Jun 1, 2025"; unparseable input is returned as-is
pub fn format_date(date: &str) -> String {
    parse_date(date)
        .map(|d| d.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|| date.to_string())
}

pub fn parse_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), DATE_FORMAT).ok()
}

/// Parses a number leniently: anything unparseable or non-finite reads as 0
pub fn parse_number(value: &str) -> f64 {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Regional-indicator flag for a two-letter country code, or a globe
pub fn country_flag(country_code: &str) -> String {
    let code = country_code.trim();
    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return "🌍".to_string();
    }
    code.to_ascii_uppercase()
        .chars()
        .filter_map(|c| char::from_u32(0x1F1E6 + (c as u32 - 'A' as u32)))
        .collect()
}

/// New unique record id
pub fn generate_id() -> String {
    format!("_{}", &uuid::Uuid::new_v4().simple().to_string()[..12])
}

/// Non-negative, finite amount
pub fn is_valid_amount(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

/// Three uppercase ASCII letters, e.g. "USD"
pub fn is_valid_currency(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase())
}

pub fn is_not_empty(value: &str) -> bool {
    !value.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency_with_symbol() {
        assert_eq!(format_currency(1234.5, "USD"), "$1,234.50");
        assert_eq!(format_currency(0.0, "EUR"), "€0.00");
        assert_eq!(format_currency(-12.5, "GBP"), "-£12.50");
        assert_eq!(format_currency(1_000_000.0, "USD"), "$1,000,000.00");
    }

    #[test]
    fn test_format_currency_without_symbol() {
        assert_eq!(format_currency(99.9, "CHF"), "99.90 CHF");
        assert_eq!(format_currency(123.0, "THB"), "123.00 THB");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2025-06-01"), "Jun 1, 2025");
        assert_eq!(format_date("not a date"), "not a date");
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("12.5"), 12.5);
        assert_eq!(parse_number(" 3 "), 3.0);
        assert_eq!(parse_number("abc"), 0.0);
        assert_eq!(parse_number("NaN"), 0.0);
        assert_eq!(parse_number(""), 0.0);
    }

    #[test]
    fn test_country_flag() {
        assert_eq!(country_flag("fr"), "🇫🇷");
        assert_eq!(country_flag("US"), "🇺🇸");
        assert_eq!(country_flag(""), "🌍");
        assert_eq!(country_flag("FRA"), "🌍");
        assert_eq!(country_flag("1A"), "🌍");
    }

    #[test]
    fn test_generate_id_is_unique() {
        let a = generate_id();
        let b = generate_id();
        assert!(a.starts_with('_'));
        assert_eq!(a.len(), 13);
        assert_ne!(a, b);
    }

    #[test]
    fn test_validators() {
        assert!(is_valid_amount(0.0));
        assert!(!is_valid_amount(-1.0));
        assert!(!is_valid_amount(f64::NAN));
        assert!(is_valid_currency("USD"));
        assert!(!is_valid_currency("usd"));
        assert!(!is_valid_currency("US"));
        assert!(is_not_empty(" x "));
        assert!(!is_not_empty("   "));
    }
}
