//! On-disk store for the rate cache
//!
//! Provides a `RateStore` that persists the whole [`RateCache`] to a single
//! JSON file, wholesale on every save. Freshness is judged by the file's
//! modification timestamp rather than a field inside the document, so a cache
//! written by hand or by an earlier version still ages out correctly.

use chrono::{DateTime, Local};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use thiserror::Error;

use crate::data::RateCache;

/// Errors that can occur when loading or saving the cache file
#[derive(Debug, Error)]
pub enum StoreError {
    /// The cache file does not exist yet
    #[error("cache file not found: {0}")]
    NotFound(PathBuf),

    /// The cache file exists but is not valid JSON of the expected shape
    #[error("cache file contains invalid data: {0}")]
    Parse(#[from] serde_json::Error),

    /// Reading or writing the file failed
    #[error("cache file I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Reads and writes the rate cache at a fixed path.
///
/// Single-process, synchronous use only: there is no locking, and a crash in
/// the middle of a save can leave a truncated file behind. A truncated file
/// surfaces as [`StoreError::Parse`] on the next load, which callers treat the
/// same as a stale cache and refresh over.
#[derive(Debug, Clone)]
pub struct RateStore {
    /// Path of the JSON cache file
    path: PathBuf,
}

impl RateStore {
    /// Creates a store for the cache file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the cache file this store manages.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the whole cache from disk.
    ///
    /// # Returns
    /// * `Ok(RateCache)` if the file exists and parses
    /// * `Err(StoreError::NotFound)` if the file is absent
    /// * `Err(StoreError::Parse)` if the file holds malformed JSON
    pub fn load(&self) -> Result<RateCache, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(self.path.clone()))
            }
            Err(e) => return Err(StoreError::Io(e)),
        };
        let cache: RateCache = serde_json::from_str(&content)?;
        Ok(cache)
    }

    /// Writes the whole cache to disk as pretty-printed UTF-8 JSON,
    /// overwriting any previous contents. Creates the parent directory if it
    /// does not exist yet.
    pub fn save(&self, cache: &RateCache) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(cache)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// Reports whether the cache file exists and was modified within
    /// `max_age`.
    ///
    /// Returns false when the file is absent or its metadata cannot be read,
    /// so a fresh process on a clean machine always starts with a refresh.
    pub fn is_fresh(&self, max_age: Duration) -> bool {
        let Some(modified) = self.modified_at_system() else {
            return false;
        };
        match SystemTime::now().duration_since(modified) {
            Ok(age) => age < max_age,
            // Modification time in the future counts as fresh
            Err(_) => true,
        }
    }

    /// Last modification time of the cache file, if it exists.
    pub fn modified_at(&self) -> Option<DateTime<Local>> {
        self.modified_at_system().map(DateTime::from)
    }

    fn modified_at_system(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).ok()?.modified().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RateTable;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn create_test_store() -> (RateStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = RateStore::new(temp_dir.path().join("currency_rate.json"));
        (store, temp_dir)
    }

    fn sample_cache() -> RateCache {
        let mut cache = RateCache::new();
        cache.insert(
            "USD".to_string(),
            RateTable {
                base_code: "USD".to_string(),
                provider: "test".to_string(),
                time_last_update_utc: String::new(),
                time_next_update_utc: String::new(),
                rates: BTreeMap::from([("EUR".to_string(), 0.9)]),
            },
        );
        cache
    }

    #[test]
    fn test_load_missing_file_is_not_found() {
        let (store, _temp_dir) = create_test_store();

        let result = store.load();

        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let (store, _temp_dir) = create_test_store();

        store.save(&sample_cache()).expect("Save should succeed");
        let loaded = store.load().expect("Load should succeed");

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded["USD"].rate_for("EUR"), Some(0.9));
    }

    #[test]
    fn test_save_writes_pretty_utf8_json() {
        let (store, _temp_dir) = create_test_store();

        store.save(&sample_cache()).expect("Save should succeed");

        let content = fs::read_to_string(store.path()).expect("Should read file");
        assert!(content.contains('\n'), "Cache file should be pretty-printed");
        assert!(content.contains("\"base_code\""));
        assert!(content.contains("\"EUR\""));
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let nested = temp_dir.path().join("nested").join("dir").join("rates.json");
        let store = RateStore::new(nested.clone());

        store.save(&sample_cache()).expect("Save should succeed");

        assert!(nested.exists(), "Cache file should exist under new directory");
    }

    #[test]
    fn test_load_malformed_json_is_parse_error() {
        let (store, _temp_dir) = create_test_store();
        fs::write(store.path(), "{not valid json").expect("Should write file");

        let result = store.load();

        assert!(matches!(result, Err(StoreError::Parse(_))));
    }

    #[test]
    fn test_is_fresh_false_for_missing_file() {
        let (store, _temp_dir) = create_test_store();

        assert!(!store.is_fresh(Duration::from_secs(24 * 3600)));
    }

    #[test]
    fn test_is_fresh_true_right_after_save() {
        let (store, _temp_dir) = create_test_store();

        store.save(&sample_cache()).expect("Save should succeed");

        assert!(store.is_fresh(Duration::from_secs(24 * 3600)));
    }

    #[test]
    fn test_is_fresh_false_after_delete() {
        let (store, _temp_dir) = create_test_store();

        store.save(&sample_cache()).expect("Save should succeed");
        fs::remove_file(store.path()).expect("Should delete file");

        assert!(!store.is_fresh(Duration::from_secs(24 * 3600)));
    }

    #[test]
    fn test_is_fresh_false_for_zero_window() {
        let (store, _temp_dir) = create_test_store();

        store.save(&sample_cache()).expect("Save should succeed");
        std::thread::sleep(Duration::from_millis(10));

        assert!(!store.is_fresh(Duration::ZERO));
    }

    #[test]
    fn test_modified_at_present_after_save_absent_before() {
        let (store, _temp_dir) = create_test_store();

        assert!(store.modified_at().is_none());
        store.save(&sample_cache()).expect("Save should succeed");
        assert!(store.modified_at().is_some());
    }

    #[test]
    fn test_save_overwrites_wholesale() {
        let (store, _temp_dir) = create_test_store();

        store.save(&sample_cache()).expect("First save should succeed");

        let mut replacement = RateCache::new();
        replacement.insert(
            "EUR".to_string(),
            RateTable {
                base_code: "EUR".to_string(),
                provider: String::new(),
                time_last_update_utc: String::new(),
                time_next_update_utc: String::new(),
                rates: BTreeMap::from([("USD".to_string(), 1.11)]),
            },
        );
        store.save(&replacement).expect("Second save should succeed");

        let loaded = store.load().expect("Load should succeed");
        assert_eq!(loaded.len(), 1, "Old entries must not survive a save");
        assert!(loaded.contains_key("EUR"));
        assert!(!loaded.contains_key("USD"));
    }
}
