//! Country metadata provider types
//!
//! Typed view of the REST Countries API records used by the destination
//! explorer, plus the fixed set of regions the API can filter on.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::format::country_flag;

/// World regions accepted by the region endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    Africa,
    Americas,
    Asia,
    Europe,
    Oceania,
}

impl Region {
    /// Returns a slice containing all region variants.
    pub fn all() -> &'static [Region] {
        &[
            Region::Africa,
            Region::Americas,
            Region::Asia,
            Region::Europe,
            Region::Oceania,
        ]
    }

    /// Name as used by the provider and shown to the user
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Africa => "Africa",
            Region::Americas => "Americas",
            Region::Asia => "Asia",
            Region::Europe => "Europe",
            Region::Oceania => "Oceania",
        }
    }

    /// Parses a region name, case-insensitively
    pub fn from_name(s: &str) -> Option<Region> {
        match s.trim().to_lowercase().as_str() {
            "africa" => Some(Region::Africa),
            "americas" | "america" => Some(Region::Americas),
            "asia" => Some(Region::Asia),
            "europe" => Some(Region::Europe),
            "oceania" => Some(Region::Oceania),
            _ => None,
        }
    }

    /// Cycles through "all regions" followed by each region in order
    pub fn cycle(current: Option<Region>) -> Option<Region> {
        let all = Region::all();
        match current {
            None => all.first().copied(),
            Some(region) => {
                let index = all.iter().position(|r| *r == region).unwrap_or(0);
                all.get(index + 1).copied()
            }
        }
    }
}

/// Common and official names of a country
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryName {
    pub common: String,
    #[serde(default)]
    pub official: String,
}

/// A currency used in a country
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyInfo {
    pub name: String,
    #[serde(default)]
    pub symbol: Option<String>,
}

/// Country record as returned by the countries provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub name: CountryName,
    /// ISO 3166-1 alpha-2 code
    #[serde(default)]
    pub cca2: String,
    #[serde(default)]
    pub capital: Vec<String>,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub subregion: Option<String>,
    /// Area in square kilometres
    #[serde(default)]
    pub area: f64,
    #[serde(default)]
    pub population: u64,
    #[serde(default)]
    pub languages: BTreeMap<String, String>,
    #[serde(default)]
    pub currencies: BTreeMap<String, CurrencyInfo>,
    #[serde(default)]
    pub timezones: Vec<String>,
}

impl Country {
    /// Whether the common or official name contains `search` (case-insensitive)
    ///
    /// An empty search matches every country.
    pub fn matches(&self, search: &str) -> bool {
        let search = search.trim().to_lowercase();
        search.is_empty()
            || self.name.common.to_lowercase().contains(&search)
            || self.name.official.to_lowercase().contains(&search)
    }

    pub fn flag(&self) -> String {
        country_flag(&self.cca2)
    }
}
