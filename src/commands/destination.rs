//! Destination commands: country list and country details

use std::io::Write;

use anyhow::{Context, Result};

use super::Services;
use crate::data::Region;
use crate::explorer::{country_details, CountryDetails, ExplorerFilter};

pub async fn countries(
    services: &Services,
    region: Option<Region>,
    search: &str,
    out: &mut dyn Write,
) -> Result<()> {
    let mut explorer = services.explorer();
    let countries = explorer
        .apply_filter(ExplorerFilter::new(region, search))
        .await
        .context("Failed to load countries")?;

    if countries.is_empty() {
        writeln!(out, "No countries found")?;
    }
    for country in countries {
        writeln!(out, "{} {:<32} {}", country.flag(), country.name.common, country.region)?;
    }
    Ok(())
}

pub async fn country(services: &Services, name: &str, out: &mut dyn Write) -> Result<()> {
    let matches = services
        .api
        .country_by_name(name)
        .await
        .with_context(|| format!("Failed to look up {}", name))?;
    let country = matches
        .iter()
        .find(|c| c.name.common.eq_ignore_ascii_case(name.trim()))
        .or_else(|| matches.first())
        .with_context(|| format!("No country matches '{}'", name))?;

    write_details(&country_details(country), out)?;

    let photos = services.explorer().photos(country).await;
    if !photos.is_empty() {
        writeln!(out)?;
        writeln!(out, "Photos (Unsplash):")?;
        for photo in &photos {
            let url = photo
                .urls
                .regular
                .as_deref()
                .or(photo.urls.small.as_deref())
                .unwrap_or("");
            let credit = photo
                .user
                .as_ref()
                .map(|u| format!(" by {}", u.name))
                .unwrap_or_default();
            writeln!(out, "  {}{}  {}", photo.caption(&country.name.common), credit, url)?;
        }
    }
    Ok(())
}

fn write_details(details: &CountryDetails, out: &mut dyn Write) -> Result<()> {
    writeln!(out, "{} {}", details.flag, details.name)?;
    writeln!(out, "  Official name: {}", details.official_name)?;
    writeln!(out, "  Capital:       {}", details.capital)?;
    writeln!(out, "  Region:        {}", details.region)?;
    writeln!(out, "  Area:          {}", details.area)?;
    writeln!(out, "  Population:    {}", details.population)?;
    writeln!(out, "  Languages:     {}", details.languages)?;
    writeln!(out, "  Currencies:    {}", details.currencies)?;
    writeln!(out, "  Timezones:     {}", details.timezones)?;
    Ok(())
}
