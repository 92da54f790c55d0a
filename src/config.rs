//! Application configuration
//!
//! Provider endpoints, request timeout, the photo API key and the data
//! directory. Values are layered: built-in defaults, then an optional JSON
//! config file, then environment variables, then CLI flags (applied by the
//! binary).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable holding the Unsplash access key
pub const UNSPLASH_KEY_ENV: &str = "UNSPLASH_ACCESS_KEY";

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "TRIPBUDGET_DATA_DIR";

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The config file is not valid JSON for `Config`
    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Root configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Exchange-rate endpoint; the base currency is appended as a path segment
    pub rates_url: String,
    /// REST Countries API root
    pub countries_url: String,
    /// Unsplash API root
    pub photos_url: String,
    /// Unsplash access key; photo search is skipped when absent
    pub unsplash_access_key: Option<String>,
    /// Timeout for every outbound request, in seconds
    pub timeout_secs: u64,
    /// Where trips, expenses and preferences are stored
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rates_url: "https://api.exchangerate-api.com/v4/latest".to_string(),
            countries_url: "https://restcountries.com/v3.1".to_string(),
            photos_url: "https://api.unsplash.com".to_string(),
            unsplash_access_key: None,
            timeout_secs: 10,
            data_dir: None,
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "tripbudget")
}

impl Config {
    /// Loads configuration from `path`, or from the default location
    ///
    /// An explicit `path` must exist. The default location
    /// (`~/.config/tripbudget/config.json` on Linux) is optional; when it is
    /// missing the built-in defaults are used. Environment overrides are
    /// applied on top in both cases.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(default) if default.exists() => Self::from_file(&default)?,
                _ => Self::default(),
            },
        };
        Ok(config.with_env(|name| std::env::var(name).ok()))
    }

    /// Reads a JSON config file; missing fields take their defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies environment overrides using `lookup` to read variables
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(key) = lookup(UNSPLASH_KEY_ENV) {
            self.unsplash_access_key = Some(key);
        }
        if let Some(dir) = lookup(DATA_DIR_ENV) {
            self.data_dir = Some(PathBuf::from(dir));
        }
        self.unsplash_access_key = self
            .unsplash_access_key
            .filter(|key| !key.trim().is_empty());
        self
    }

    /// Default config file location, if a home directory can be determined
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("config.json"))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The configured data directory, or the XDG data directory
    ///
    /// Returns `None` if neither is available (e.g. no home directory).
    pub fn resolve_data_dir(&self) -> Option<PathBuf> {
        self.data_dir
            .clone()
            .or_else(|| project_dirs().map(|dirs| dirs.data_dir().to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert!(config.rates_url.contains("exchangerate-api.com"));
        assert!(config.countries_url.ends_with("/v3.1"));
        assert!(config.unsplash_access_key.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, r#"{"timeout_secs": 3, "unsplash_access_key": "abc"}"#).unwrap();

        let config = Config::from_file(&path).unwrap();

        assert_eq!(config.timeout(), Duration::from_secs(3));
        assert_eq!(config.unsplash_access_key.as_deref(), Some("abc"));
        assert_eq!(config.photos_url, Config::default().photos_url);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = Config::load(Some(&temp_dir.path().join("nope.json")));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let err = Config::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid config file"));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            (UNSPLASH_KEY_ENV, "from-env"),
            (DATA_DIR_ENV, "/tmp/tripbudget-test"),
        ]
        .into_iter()
        .collect();

        let config = Config::default().with_env(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.unsplash_access_key.as_deref(), Some("from-env"));
        assert_eq!(
            config.resolve_data_dir(),
            Some(PathBuf::from("/tmp/tripbudget-test"))
        );
    }

    #[test]
    fn test_blank_key_is_treated_as_missing() {
        let config = Config {
            unsplash_access_key: Some("   ".to_string()),
            ..Config::default()
        };
        let config = config.with_env(|_| None);
        assert!(config.unsplash_access_key.is_none());
    }
}
