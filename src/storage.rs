//! Persistence wrapper for user data
//!
//! Stores JSON-serializable values under fixed string keys, one file per key,
//! in the data directory (`~/.local/share/tripbudget/` on Linux).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::config::Config;

/// Fixed keys under which the controllers persist their state
pub mod keys {
    pub const TRIPS: &str = "tbc_trips";
    pub const EXPENSES: &str = "tbc_expenses";
    pub const PREFERENCES: &str = "tbc_preferences";
    pub const CONVERSION_HISTORY: &str = "tbc_conversion_history";
    pub const FAVORITE_CURRENCIES: &str = "tbc_favorite_currencies";
}

/// Errors that can occur when writing to the store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure
    #[error("Storage I/O failed: {0}")]
    Io(#[from] io::Error),

    /// The value could not be serialized
    #[error("Failed to serialize value: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Synchronous key/value store backed by JSON files
#[derive(Debug, Clone)]
pub struct Store {
    /// Directory where value files are stored
    dir: PathBuf,
}

impl Store {
    /// Creates a store in the configured (or XDG) data directory
    ///
    /// Returns `None` if no data directory can be determined.
    pub fn new(config: &Config) -> Option<Self> {
        config.resolve_data_dir().map(Self::with_dir)
    }

    /// Creates a store rooted at a specific directory
    pub fn with_dir(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Reads the value stored under `key`
    ///
    /// Returns `None` when nothing is stored. A value that cannot be parsed is
    /// logged, removed and read as absent.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.path(key);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(key, error = %e, "failed to read stored value");
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "discarding unreadable stored value");
                if let Err(e) = self.remove(key) {
                    warn!(key, error = %e, "failed to remove unreadable value");
                }
                None
            }
        }
    }

    /// Reads the value under `key`, or `T::default()` when absent
    pub fn get_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        self.get(key).unwrap_or_default()
    }

    /// Stores `value` under `key`, replacing any previous value
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(value)?;

        // Write then rename so a crash never leaves a half-written file
        let tmp = self.dir.join(format!(".{}.json.tmp", key));
        fs::write(&tmp, json)?;
        fs::rename(&tmp, self.path(key))?;
        Ok(())
    }

    /// Removes the value under `key`; removing a missing key is not an error
    pub fn remove(&self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path(key)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    /// Removes every stored value
    pub fn clear(&self) -> Result<(), StoreError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct TestData {
        name: String,
        value: i32,
    }

    fn create_test_store() -> (Store, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = Store::with_dir(temp_dir.path().to_path_buf());
        (store, temp_dir)
    }

    #[test]
    fn test_set_creates_file_in_data_directory() {
        let (store, temp_dir) = create_test_store();
        let data = TestData {
            name: "test".to_string(),
            value: 42,
        };

        store.set("test_key", &data).expect("Write should succeed");

        let expected_path = temp_dir.path().join("test_key.json");
        assert!(expected_path.exists(), "Value file should exist");
        let content = fs::read_to_string(&expected_path).unwrap();
        assert!(content.contains("\"name\""));
        assert!(content.contains("42"));
    }

    #[test]
    fn test_get_returns_none_for_missing_key() {
        let (store, _temp_dir) = create_test_store();
        let result: Option<TestData> = store.get("nonexistent_key");
        assert!(result.is_none());
    }

    #[test]
    fn test_get_returns_stored_value() {
        let (store, _temp_dir) = create_test_store();
        let data = vec![
            TestData {
                name: "a".to_string(),
                value: 1,
            },
            TestData {
                name: "b".to_string(),
                value: 2,
            },
        ];

        store.set(keys::TRIPS, &data).unwrap();

        let read: Vec<TestData> = store.get(keys::TRIPS).unwrap();
        assert_eq!(read, data);
    }

    #[test]
    fn test_get_or_default_for_missing_key() {
        let (store, _temp_dir) = create_test_store();
        let read: Vec<TestData> = store.get_or_default(keys::EXPENSES);
        assert!(read.is_empty());
    }

    #[test]
    fn test_corrupt_value_is_removed_and_read_as_absent() {
        let (store, temp_dir) = create_test_store();
        let path = temp_dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let result: Option<TestData> = store.get("broken");

        assert!(result.is_none());
        assert!(!path.exists(), "Corrupt file should be removed");
    }

    #[test]
    fn test_overwrite_existing_value() {
        let (store, _temp_dir) = create_test_store();
        store.set("key", &1).unwrap();
        store.set("key", &2).unwrap();
        assert_eq!(store.get::<i32>("key"), Some(2));
    }

    #[test]
    fn test_set_creates_directory_if_missing() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("nested").join("data");
        let store = Store::with_dir(nested.clone());

        store.set("key", "value").unwrap();

        assert!(nested.join("key.json").exists());
    }

    #[test]
    fn test_remove_and_clear() {
        let (store, _temp_dir) = create_test_store();
        store.set("a", &1).unwrap();
        store.set("b", &2).unwrap();

        store.remove("a").unwrap();
        store.remove("a").expect("Removing twice is fine");
        assert!(store.get::<i32>("a").is_none());

        store.clear().unwrap();
        assert!(store.get::<i32>("b").is_none());
    }

    #[test]
    fn test_clear_on_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::with_dir(temp_dir.path().join("never-created"));
        store.clear().expect("Clearing a missing directory is fine");
    }

    #[test]
    fn test_new_uses_configured_dir() {
        let config = Config {
            data_dir: Some(PathBuf::from("/tmp/tripbudget-store")),
            ..Config::default()
        };
        let store = Store::new(&config).unwrap();
        assert_eq!(store.dir(), Path::new("/tmp/tripbudget-store"));
    }
}
