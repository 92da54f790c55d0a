//! Destination explorer
//!
//! Browses countries from the cached countries provider, filtered by region
//! and by a name search, and assembles the facts shown for one country.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::data::api::DEFAULT_PHOTO_COUNT;
use crate::data::{Country, FetchError, Photo, Region, TravelApi};

/// Region and name search currently applied to the country list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExplorerFilter {
    /// `None` browses every country
    pub region: Option<Region>,
    /// Case-insensitive match on common or official name; empty matches all
    pub search: String,
}

impl ExplorerFilter {
    pub fn new(region: Option<Region>, search: impl Into<String>) -> Self {
        Self {
            region,
            search: search.into(),
        }
    }
}

/// Display facts for a single country
#[derive(Debug, Clone, PartialEq)]
pub struct CountryDetails {
    pub name: String,
    pub flag: String,
    pub official_name: String,
    pub capital: String,
    /// "Europe (Western Europe)"
    pub region: String,
    /// "551,695 km²"
    pub area: String,
    /// "67.4 million"
    pub population: String,
    pub languages: String,
    pub currencies: String,
    /// At most the first three timezones
    pub timezones: String,
}

const NOT_AVAILABLE: &str = "N/A";

fn join_or_na<'a>(items: impl Iterator<Item = &'a str>) -> String {
    let joined = items.collect::<Vec<_>>().join(", ");
    if joined.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        joined
    }
}

/// Formats a whole number with comma thousands separators
fn group_digits(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

/// Builds the display facts for `country`
pub fn country_details(country: &Country) -> CountryDetails {
    let region = match country.subregion.as_deref().filter(|s| !s.is_empty()) {
        Some(subregion) => format!("{} ({})", country.region, subregion),
        None => country.region.clone(),
    };

    CountryDetails {
        name: country.name.common.clone(),
        flag: country.flag(),
        official_name: country.name.official.clone(),
        capital: country
            .capital
            .first()
            .cloned()
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        region,
        area: format!("{} km²", group_digits(country.area.round() as u64)),
        population: format!("{:.1} million", country.population as f64 / 1_000_000.0),
        languages: join_or_na(country.languages.values().map(String::as_str)),
        currencies: join_or_na(country.currencies.values().map(|c| c.name.as_str())),
        timezones: join_or_na(country.timezones.iter().take(3).map(String::as_str)),
    }
}

/// Country list state for the `countries` command and the explorer view
#[derive(Debug, Clone)]
pub struct Explorer {
    api: TravelApi,
    filter: ExplorerFilter,
    /// Region of the list held in `base`; `None` until the first load
    loaded: Option<Option<Region>>,
    base: Arc<Vec<Country>>,
    visible: Vec<Country>,
}

impl Explorer {
    pub fn new(api: TravelApi) -> Self {
        Self {
            api,
            filter: ExplorerFilter::default(),
            loaded: None,
            base: Arc::new(Vec::new()),
            visible: Vec::new(),
        }
    }

    pub fn filter(&self) -> &ExplorerFilter {
        &self.filter
    }

    /// Countries matching the current filter
    pub fn countries(&self) -> &[Country] {
        &self.visible
    }

    /// Whether a base list has been loaded
    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    /// Applies `filter`, fetching a new base list only when its region differs
    /// from the loaded one
    ///
    /// On a fetch failure the previous filter and list are kept.
    ///
    /// # Returns
    /// The countries matching the new filter
    pub async fn apply_filter(&mut self, filter: ExplorerFilter) -> Result<&[Country], FetchError> {
        if self.loaded != Some(filter.region) {
            let base = match filter.region {
                Some(region) => self.api.countries_by_region(region).await?,
                None => self.api.all_countries().await?,
            };
            debug!(region = ?filter.region, count = base.len(), "loaded country list");
            self.base = base;
            self.loaded = Some(filter.region);
        }
        self.filter = filter;
        self.refresh_visible();
        Ok(&self.visible)
    }

    /// Drops every cached provider response and reloads the current filter
    ///
    /// On failure the previous list stays loaded.
    pub async fn refresh(&mut self) -> Result<&[Country], FetchError> {
        self.api.invalidate_all();
        let previous = self.loaded.take();
        let filter = self.filter.clone();
        let result = self.apply_filter(filter).await.map(|_| ());
        if let Err(e) = result {
            self.loaded = previous;
            return Err(e);
        }
        Ok(&self.visible)
    }

    /// Changes the search text; never fetches
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.filter.search = search.into();
        self.refresh_visible();
    }

    fn refresh_visible(&mut self) {
        self.visible = self
            .base
            .iter()
            .filter(|country| country.matches(&self.filter.search))
            .cloned()
            .collect();
    }

    /// Destination photos for `country`; any failure yields an empty gallery
    pub async fn photos(&self, country: &Country) -> Vec<Photo> {
        match self
            .api
            .destination_photos(&country.name.common, DEFAULT_PHOTO_COUNT)
            .await
        {
            Ok(photos) => photos.as_ref().clone(),
            Err(e) => {
                warn!(country = %country.name.common, error = %e, "photo search failed");
                Vec::new()
            }
        }
    }
}
