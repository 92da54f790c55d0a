//! Cache-backed provider calls
//!
//! `TravelApi` is the single entry point controllers use to reach the remote
//! exchange-rate, country-metadata and photo-search providers. Every call goes
//! through a `FetchCache` keyed by a logical request key, with a freshness
//! window chosen per data kind.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use reqwest::Url;
use tracing::warn;

use super::countries::{Country, Region};
use super::http::{FetchError, HttpFetcher};
use super::photos::{Photo, PhotoSearchResponse};
use super::rates::{mock_history, ExchangeRates, RatePoint};
use crate::cache::FetchCache;
use crate::config::Config;

/// Freshness window for exchange rates
pub const RATES_FRESHNESS: Duration = Duration::from_secs(5 * 60);

/// Freshness window for country lists (all, by name, by region)
pub const COUNTRIES_FRESHNESS: Duration = Duration::from_secs(24 * 60 * 60);

/// Freshness window for destination photo searches
pub const PHOTOS_FRESHNESS: Duration = Duration::from_secs(24 * 60 * 60);

/// Freshness window for the mocked rate history
pub const HISTORY_FRESHNESS: Duration = Duration::from_secs(60 * 60);

/// Number of photos requested for a destination gallery
pub const DEFAULT_PHOTO_COUNT: u32 = 6;

/// Client for every remote provider, fronted by the fetch caches
///
/// Created once at startup and shared by reference (or cheap clone) with every
/// controller; clones share the same caches.
#[derive(Debug, Clone)]
pub struct TravelApi {
    fetcher: HttpFetcher,
    rates_url: String,
    countries_url: String,
    photos_url: String,
    unsplash_access_key: Option<String>,
    rates: FetchCache<ExchangeRates, FetchError>,
    countries: FetchCache<Vec<Country>, FetchError>,
    photos: FetchCache<Vec<Photo>, FetchError>,
    history: FetchCache<Vec<RatePoint>, FetchError>,
}

impl TravelApi {
    /// Creates a client using the endpoints, key and timeout from `config`
    pub fn new(config: &Config) -> Self {
        Self {
            fetcher: HttpFetcher::new(config.timeout()),
            rates_url: config.rates_url.trim_end_matches('/').to_string(),
            countries_url: config.countries_url.trim_end_matches('/').to_string(),
            photos_url: config.photos_url.trim_end_matches('/').to_string(),
            unsplash_access_key: config.unsplash_access_key.clone(),
            rates: FetchCache::new(),
            countries: FetchCache::new(),
            photos: FetchCache::new(),
            history: FetchCache::new(),
        }
    }

    /// Exchange rates for `base` (key `rates_<BASE>`, 5 minutes)
    pub async fn exchange_rates(&self, base: &str) -> Result<Arc<ExchangeRates>, FetchError> {
        let key = format!("rates_{}", base);
        let url = format!("{}/{}", self.rates_url, urlencoding::encode(base));
        let fetcher = self.fetcher.clone();

        self.rates
            .resolve(
                &key,
                move || async move { fetcher.get_json::<ExchangeRates>(&url, &[]).await },
                RATES_FRESHNESS,
            )
            .await
    }

    /// Every country (key `all_countries`, 24 hours)
    pub async fn all_countries(&self) -> Result<Arc<Vec<Country>>, FetchError> {
        let url = format!("{}/all", self.countries_url);
        self.fetch_countries("all_countries".to_string(), url).await
    }

    /// Countries whose name matches `name` (key `country_<name>`, 24 hours)
    ///
    /// Names shorter than two characters yield an empty list without a request.
    pub async fn country_by_name(&self, name: &str) -> Result<Arc<Vec<Country>>, FetchError> {
        let name = name.trim();
        if name.chars().count() < 2 {
            return Ok(Arc::new(Vec::new()));
        }
        let key = format!("country_{}", name.to_lowercase());
        let url = format!("{}/name/{}", self.countries_url, urlencoding::encode(name));
        self.fetch_countries(key, url).await
    }

    /// Countries in `region` (key `region_<region>`, 24 hours)
    pub async fn countries_by_region(&self, region: Region) -> Result<Arc<Vec<Country>>, FetchError> {
        let key = format!("region_{}", region.as_str().to_lowercase());
        let url = format!(
            "{}/region/{}",
            self.countries_url,
            region.as_str().to_lowercase()
        );
        self.fetch_countries(key, url).await
    }

    async fn fetch_countries(&self, key: String, url: String) -> Result<Arc<Vec<Country>>, FetchError> {
        let fetcher = self.fetcher.clone();
        self.countries
            .resolve(
                &key,
                move || async move { fetcher.get_json::<Vec<Country>>(&url, &[]).await },
                COUNTRIES_FRESHNESS,
            )
            .await
    }

    /// Landscape travel photos for a destination (key `photos_<country>`, 24 hours)
    ///
    /// Without a configured access key this returns an empty list and makes no
    /// request.
    pub async fn destination_photos(
        &self,
        country: &str,
        count: u32,
    ) -> Result<Arc<Vec<Photo>>, FetchError> {
        let Some(access_key) = self.unsplash_access_key.clone() else {
            warn!("Unsplash access key not configured; set UNSPLASH_ACCESS_KEY to enable photos");
            return Ok(Arc::new(Vec::new()));
        };

        let key = format!("photos_{}", country.to_lowercase());
        let url = Url::parse_with_params(
            &format!("{}/search/photos", self.photos_url),
            &[
                ("query", format!("{} travel", country)),
                ("per_page", count.to_string()),
                ("orientation", "landscape".to_string()),
            ],
        )
        .map_err(|e| FetchError::Producer(format!("Invalid photos URL: {}", e)))?;
        let fetcher = self.fetcher.clone();

        self.photos
            .resolve(
                &key,
                move || async move {
                    let authorization = format!("Client-ID {}", access_key);
                    let response: PhotoSearchResponse = fetcher
                        .get_json(url.as_str(), &[("Authorization", authorization.as_str())])
                        .await?;
                    Ok(response.results)
                },
                PHOTOS_FRESHNESS,
            )
            .await
    }

    /// Mocked daily history of the `base`/`target` rate over the last `days`
    /// days (key `history_<base>_<target>_<days>`, 1 hour)
    ///
    /// Derived from the current rate; a target missing from the rate table is
    /// treated as a rate of 1.
    pub async fn rate_history(
        &self,
        base: &str,
        target: &str,
        days: u32,
    ) -> Result<Arc<Vec<RatePoint>>, FetchError> {
        let key = format!("history_{}_{}_{}", base, target, days);
        let api = self.clone();
        let base = base.to_string();
        let target = target.to_string();

        self.history
            .resolve(
                &key,
                move || async move {
                    let rates = api.exchange_rates(&base).await?;
                    let rate = rates.rate(&target).unwrap_or(1.0);
                    let today = Local::now().date_naive();
                    Ok(mock_history(rate, days, today, &mut rand::thread_rng()))
                },
                HISTORY_FRESHNESS,
            )
            .await
    }

    /// Clears every cached response and in-flight marker
    pub fn invalidate_all(&self) {
        self.rates.invalidate_all();
        self.countries.invalidate_all();
        self.photos.invalidate_all();
        self.history.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    const RATES_BODY: &str = r#"{"base": "USD", "date": "2025-06-01", "rates": {"USD": 1, "EUR": 0.91, "GBP": 0.79}}"#;

    const COUNTRIES_BODY: &str = r#"[
        {"name": {"common": "France", "official": "French Republic"}, "cca2": "FR", "region": "Europe"},
        {"name": {"common": "Germany", "official": "Federal Republic of Germany"}, "cca2": "DE", "region": "Europe"}
    ]"#;

    fn api_for(server: &Server, access_key: Option<&str>) -> TravelApi {
        let config = Config {
            rates_url: format!("{}/latest", server.url()),
            countries_url: server.url(),
            photos_url: server.url(),
            unsplash_access_key: access_key.map(str::to_string),
            timeout_secs: 1,
            data_dir: None,
        };
        TravelApi::new(&config)
    }

    #[tokio::test]
    async fn test_exchange_rates_fetched_once_while_fresh() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/latest/USD")
            .with_status(200)
            .with_body(RATES_BODY)
            .expect(1)
            .create_async()
            .await;
        let api = api_for(&server, None);

        let first = api.exchange_rates("USD").await.unwrap();
        let second = api.exchange_rates("USD").await.unwrap();

        assert_eq!(first.rate("EUR"), Some(0.91));
        assert!(Arc::ptr_eq(&first, &second));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_simultaneous_country_requests_share_one_http_call() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/all")
            .with_status(200)
            .with_body(COUNTRIES_BODY)
            .expect(1)
            .create_async()
            .await;
        let api = api_for(&server, None);

        let (a, b) = tokio::join!(api.all_countries(), api.all_countries());

        let (a, b) = (a.unwrap(), b.unwrap());
        assert_eq!(a.len(), 2);
        assert!(Arc::ptr_eq(&a, &b));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_country_by_name_key_is_case_normalized() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Regex(r"^/name/".to_string()))
            .with_status(200)
            .with_body(COUNTRIES_BODY)
            .expect(1)
            .create_async()
            .await;
        let api = api_for(&server, None);

        api.country_by_name("France").await.unwrap();
        api.country_by_name("france").await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_country_name_is_percent_encoded_in_path() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Regex(r"^/name/C%C3%B4te%20d%27Ivoire$".to_string()))
            .with_status(200)
            .with_body(COUNTRIES_BODY)
            .expect(1)
            .create_async()
            .await;
        let api = api_for(&server, None);

        api.country_by_name("Côte d'Ivoire").await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_country_by_short_name_skips_request() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;
        let api = api_for(&server, None);

        let result = api.country_by_name("f").await.unwrap();

        assert!(result.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_region_uses_region_endpoint() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/region/europe")
            .with_status(200)
            .with_body(COUNTRIES_BODY)
            .create_async()
            .await;
        let api = api_for(&server, None);

        let countries = api.countries_by_region(Region::Europe).await.unwrap();

        assert!(countries.iter().all(|c| c.region == "Europe"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_status_failure_without_cache_propagates() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/latest/USD")
            .with_status(500)
            .create_async()
            .await;
        let api = api_for(&server, None);

        let err = api.exchange_rates("USD").await.unwrap_err();

        assert_eq!(err, FetchError::Status(500));
    }

    #[tokio::test]
    async fn test_malformed_body_is_a_parse_failure() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/all")
            .with_status(200)
            .with_body(r#"{"message": "not a list"}"#)
            .create_async()
            .await;
        let api = api_for(&server, None);

        let err = api.all_countries().await.unwrap_err();

        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[tokio::test]
    async fn test_photos_without_key_returns_empty_without_request() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;
        let api = api_for(&server, None);

        let photos = api.destination_photos("France", DEFAULT_PHOTO_COUNT).await.unwrap();

        assert!(photos.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_photos_request_carries_query_and_key() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/search/photos")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("query".into(), "France travel".into()),
                Matcher::UrlEncoded("per_page".into(), "6".into()),
                Matcher::UrlEncoded("orientation".into(), "landscape".into()),
            ]))
            .match_header("authorization", "Client-ID secret")
            .with_status(200)
            .with_body(r#"{"results": [{"id": "p1", "urls": {"small": "https://img/p1"}}]}"#)
            .create_async()
            .await;
        let api = api_for(&server, Some("secret"));

        let photos = api.destination_photos("France", DEFAULT_PHOTO_COUNT).await.unwrap();

        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0].id, "p1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_photos_with_unusable_base_url_is_a_producer_failure() {
        let config = Config {
            photos_url: "not a url".to_string(),
            unsplash_access_key: Some("secret".to_string()),
            ..Config::default()
        };
        let api = TravelApi::new(&config);

        let err = api.destination_photos("France", 3).await.unwrap_err();

        assert!(matches!(err, FetchError::Producer(_)));
        assert!(err.to_string().contains("Invalid photos URL"));
    }

    #[tokio::test]
    async fn test_photos_timeout_without_cache_raises_timeout() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        let config = Config {
            photos_url: format!("http://{}", addr),
            unsplash_access_key: Some("secret".to_string()),
            timeout_secs: 1,
            ..Config::default()
        };
        let api = TravelApi::new(&config);

        let err = api.destination_photos("France", 6).await.unwrap_err();

        assert_eq!(err, FetchError::Timeout(Duration::from_secs(1)));
    }

    #[tokio::test]
    async fn test_rate_history_derives_from_current_rate() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/latest/USD")
            .with_status(200)
            .with_body(RATES_BODY)
            .expect(1)
            .create_async()
            .await;
        let api = api_for(&server, None);

        let history = api.rate_history("USD", "EUR", 7).await.unwrap();
        let again = api.rate_history("USD", "EUR", 7).await.unwrap();
        let unknown = api.rate_history("USD", "XXX", 2).await.unwrap();

        assert_eq!(history.len(), 8);
        assert!(Arc::ptr_eq(&history, &again));
        assert!(history.iter().all(|p| (p.rate - 0.91).abs() <= 0.91 * 0.05 + 1e-9));
        assert!(unknown.iter().all(|p| (p.rate - 1.0).abs() <= 0.05 + 1e-9));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_invalidate_all_forces_new_request() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/latest/EUR")
            .with_status(200)
            .with_body(r#"{"base": "EUR", "rates": {"EUR": 1, "USD": 1.1}}"#)
            .expect(2)
            .create_async()
            .await;
        let api = api_for(&server, None);

        api.exchange_rates("EUR").await.unwrap();
        api.invalidate_all();
        api.exchange_rates("EUR").await.unwrap();

        mock.assert_async().await;
    }
}
