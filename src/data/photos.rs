//! Destination photo search types (Unsplash)

use serde::{Deserialize, Serialize};

/// Image URLs at the sizes the app uses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoUrls {
    #[serde(default)]
    pub small: Option<String>,
    #[serde(default)]
    pub regular: Option<String>,
}

/// Photographer credit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoUser {
    pub name: String,
}

/// A single photo search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    pub id: String,
    pub urls: PhotoUrls,
    #[serde(default)]
    pub alt_description: Option<String>,
    #[serde(default)]
    pub user: Option<PhotoUser>,
}

impl Photo {
    /// Short caption, falling back to the destination name
    pub fn caption(&self, fallback: &str) -> String {
        self.alt_description
            .clone()
            .unwrap_or_else(|| fallback.to_string())
    }
}

/// Search endpoint response; a missing `results` field reads as no photos
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PhotoSearchResponse {
    #[serde(default)]
    pub results: Vec<Photo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_response() {
        let json = r#"{
            "total": 2,
            "total_pages": 1,
            "results": [
                {"id": "a1", "urls": {"small": "https://img/a1-small", "regular": "https://img/a1"},
                 "alt_description": "Eiffel tower at dusk", "user": {"name": "Ana"}},
                {"id": "b2", "urls": {"small": "https://img/b2-small"}}
            ]
        }"#;

        let response: PhotoSearchResponse = serde_json::from_str(json).unwrap();

        assert_eq!(response.results.len(), 2);
        assert_eq!(response.results[0].caption("France"), "Eiffel tower at dusk");
        assert_eq!(response.results[1].caption("France"), "France");
        assert!(response.results[1].urls.regular.is_none());
        assert_eq!(response.results[0].user.as_ref().unwrap().name, "Ana");
    }

    #[test]
    fn test_missing_results_reads_as_empty() {
        let response: PhotoSearchResponse = serde_json::from_str(r#"{"total": 0}"#).unwrap();
        assert!(response.results.is_empty());
    }
}
