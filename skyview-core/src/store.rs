//! Client-local key-value persistence for the slices of state that survive
//! restarts: recent searches, favorite cities and the temperature unit.

use anyhow::{Context, Result, anyhow};
use serde::{Serialize, de::DeserializeOwned};
use std::{
    collections::HashMap,
    fmt::Debug,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use crate::model::{FavoriteCity, RecentSearch, TemperatureUnit};

pub const RECENT_SEARCHES_KEY: &str = "recentSearches";
pub const FAVORITE_CITIES_KEY: &str = "favoriteCities";
pub const TEMPERATURE_UNIT_KEY: &str = "temperatureUnit";

/// String-keyed storage of JSON documents.
pub trait KeyValueStore: Send + Sync + Debug {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&self, key: &str) -> Result<()>;
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(anyhow!("Invalid storage key '{key}'"));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read storage file: {}", path.display()))?;
        Ok(Some(contents))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        write_atomic(&path, value.as_bytes())
            .with_context(|| format!("Failed to write storage file: {}", path.display()))
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err)
                .with_context(|| format!("Failed to remove storage file: {}", path.display())),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn items(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.items
            .lock()
            .map_err(|_| anyhow!("In-memory store lock poisoned"))
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.items()?.remove(key);
        Ok(())
    }
}

/// The persisted slices, as read at start-up.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredData {
    pub recent_searches: Vec<RecentSearch>,
    pub favorite_cities: Vec<FavoriteCity>,
    pub temperature_unit: TemperatureUnit,
}

/// Read all persisted slices. Missing or unreadable keys fall back to their
/// defaults so one bad file never blocks start-up.
pub fn load_stored_data(store: &dyn KeyValueStore) -> StoredData {
    StoredData {
        recent_searches: read_or_default(store, RECENT_SEARCHES_KEY),
        favorite_cities: read_or_default(store, FAVORITE_CITIES_KEY),
        temperature_unit: read_or_default(store, TEMPERATURE_UNIT_KEY),
    }
}

pub fn read_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>> {
    let Some(raw) = store.get_item(key)? else {
        return Ok(None);
    };

    let value = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse stored value for '{key}'"))?;
    Ok(Some(value))
}

pub fn write_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<()> {
    let raw = serde_json::to_string(value)
        .with_context(|| format!("Failed to serialize value for '{key}'"))?;
    store.set_item(key, &raw)
}

fn read_or_default<T: DeserializeOwned + Default>(store: &dyn KeyValueStore, key: &str) -> T {
    match read_json(store, key) {
        Ok(Some(value)) => value,
        Ok(None) => T::default(),
        Err(err) => {
            tracing::warn!("Error loading stored data for '{key}': {err:#}");
            T::default()
        }
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let parent = path.parent().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "storage path must have a parent directory",
        )
    })?;
    fs::create_dir_all(parent)?;

    let tmp_path = path.with_extension(format!("{}.tmp", std::process::id()));
    fs::write(&tmp_path, bytes)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_search() -> RecentSearch {
        RecentSearch {
            city: "Karachi".into(),
            country: "Pakistan".into(),
            timestamp: 1_725_000_000_000,
        }
    }

    #[test]
    fn file_store_set_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));

        assert_eq!(store.get_item("temperatureUnit").unwrap(), None);

        store.set_item("temperatureUnit", "\"F\"").unwrap();
        assert_eq!(store.get_item("temperatureUnit").unwrap().as_deref(), Some("\"F\""));
        assert!(dir.path().join("nested/temperatureUnit.json").exists());

        store.remove_item("temperatureUnit").unwrap();
        assert_eq!(store.get_item("temperatureUnit").unwrap(), None);
        // removing twice is fine
        store.remove_item("temperatureUnit").unwrap();
    }

    #[test]
    fn file_store_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let err = store.set_item("../escape", "{}").unwrap_err();
        assert!(err.to_string().contains("Invalid storage key"));
    }

    #[test]
    fn load_defaults_when_empty() {
        let store = MemoryStore::new();
        assert_eq!(load_stored_data(&store), StoredData::default());
    }

    #[test]
    fn load_reads_written_slices() {
        let store = MemoryStore::new();
        write_json(&store, RECENT_SEARCHES_KEY, &[sample_search()]).unwrap();
        write_json(&store, TEMPERATURE_UNIT_KEY, &TemperatureUnit::F).unwrap();

        let data = load_stored_data(&store);
        assert_eq!(data.recent_searches, vec![sample_search()]);
        assert!(data.favorite_cities.is_empty());
        assert_eq!(data.temperature_unit, TemperatureUnit::F);
    }

    #[test]
    fn corrupt_slice_falls_back_without_losing_others() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.set_item(FAVORITE_CITIES_KEY, "{not json").unwrap();
        write_json(&store, RECENT_SEARCHES_KEY, &[sample_search()]).unwrap();

        let data = load_stored_data(&store);
        assert!(data.favorite_cities.is_empty());
        assert_eq!(data.recent_searches.len(), 1);
    }

    #[test]
    fn unit_is_stored_as_json_string() {
        let store = MemoryStore::new();
        write_json(&store, TEMPERATURE_UNIT_KEY, &TemperatureUnit::C).unwrap();
        assert_eq!(
            store.get_item(TEMPERATURE_UNIT_KEY).unwrap().as_deref(),
            Some("\"C\"")
        );
    }
}
