//! Saving a form to a key-value store and reading it back, with lazy expiry.

use crate::error::StoreError;
use crate::form::FormConfig;
use ahash::AHashMap;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

/// The single key every form record is stored under.
pub const STORAGE_KEY: &str = "formBuilderData";

/// Records older than this are dropped on the next read.
pub const EXPIRATION_MS: i64 = 24 * 60 * 60 * 1000;

/// The persisted form: configuration, field values and the time of saving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedForm {
    pub config: FormConfig,
    #[serde(default)]
    pub form_state: AHashMap<String, Value>,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl PersistedForm {
    pub fn new(config: FormConfig, form_state: AHashMap<String, Value>) -> Self {
        Self {
            config,
            form_state,
            timestamp: now_millis(),
        }
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        now - self.timestamp >= EXPIRATION_MS
    }
}

/// A minimal string key-value store.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-process store, mostly useful for tests and short-lived sessions.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: AHashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            key: key.to_string(),
            source,
        };
        fs::create_dir_all(&self.dir).map_err(io_err)?;
        fs::write(self.path_for(key), value).map_err(io_err)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Saves `record`, stamping it with the current time.
pub fn save(store: &mut dyn KeyValueStore, record: &mut PersistedForm) -> Result<(), StoreError> {
    save_at(store, record, now_millis())
}

pub fn save_at(
    store: &mut dyn KeyValueStore,
    record: &mut PersistedForm,
    now: i64,
) -> Result<(), StoreError> {
    record.timestamp = now;
    let json = serde_json::to_string(record)?;
    store.set(STORAGE_KEY, json)
}

/// Reads the saved record. Expired records are removed and reported as absent.
pub fn load(store: &mut dyn KeyValueStore) -> Result<Option<PersistedForm>, StoreError> {
    load_at(store, now_millis())
}

pub fn load_at(
    store: &mut dyn KeyValueStore,
    now: i64,
) -> Result<Option<PersistedForm>, StoreError> {
    let Some(raw) = store.get(STORAGE_KEY)? else {
        return Ok(None);
    };
    let record: PersistedForm = serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt {
        key: STORAGE_KEY.to_string(),
        message: e.to_string(),
    })?;

    if record.is_expired_at(now) {
        log::info!(
            "Discarding saved form from {} ms ago",
            now - record.timestamp
        );
        store.remove(STORAGE_KEY)?;
        return Ok(None);
    }
    Ok(Some(record))
}

pub fn load_config(store: &mut dyn KeyValueStore) -> Result<Option<FormConfig>, StoreError> {
    Ok(load(store)?.map(|record| record.config))
}

pub fn clear(store: &mut dyn KeyValueStore) -> Result<(), StoreError> {
    store.remove(STORAGE_KEY)
}
