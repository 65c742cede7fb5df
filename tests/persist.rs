//! Tests for saving and loading the form record.
mod common;
use common::*;
use formrule::persist::{self, EXPIRATION_MS, STORAGE_KEY};
use formrule::prelude::*;
use serde_json::json;

fn sample_record() -> PersistedForm {
    let config = create_address_config("http://localhost");
    let mut values = ahash::AHashMap::new();
    values.insert("country".to_string(), json!("DE"));
    PersistedForm::new(config, values)
}

#[test]
fn test_round_trip_within_expiry() {
    let mut store = MemoryStore::new();
    let mut record = sample_record();
    persist::save_at(&mut store, &mut record, 1_000).unwrap();
    assert_eq!(record.timestamp, 1_000);

    let loaded = persist::load_at(&mut store, 1_000 + EXPIRATION_MS - 1)
        .unwrap()
        .unwrap();
    assert_eq!(loaded, record);
}

#[test]
fn test_expired_record_is_removed_on_read() {
    let mut store = MemoryStore::new();
    let mut record = sample_record();
    persist::save_at(&mut store, &mut record, 0).unwrap();

    assert!(persist::load_at(&mut store, EXPIRATION_MS).unwrap().is_none());
    assert!(store.get(STORAGE_KEY).unwrap().is_none());
}

#[test]
fn test_record_uses_camel_case_keys() {
    let mut store = MemoryStore::new();
    let mut record = sample_record();
    persist::save(&mut store, &mut record).unwrap();

    let raw = store.get(STORAGE_KEY).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["formState"]["country"], json!("DE"));
    assert!(value["timestamp"].is_i64());
    assert_eq!(value["config"]["fields"][0]["id"], json!("country"));
}

#[test]
fn test_missing_record_is_none() {
    let mut store = MemoryStore::new();
    assert!(persist::load(&mut store).unwrap().is_none());
    assert!(persist::load_config(&mut store).unwrap().is_none());
}

#[test]
fn test_corrupt_record_is_an_error() {
    let mut store = MemoryStore::new();
    store.set(STORAGE_KEY, "{not json".to_string()).unwrap();
    let err = persist::load(&mut store).unwrap_err();
    assert!(matches!(err, StoreError::Corrupt { .. }));
}

#[test]
fn test_clear_removes_record() {
    let mut store = MemoryStore::new();
    persist::save(&mut store, &mut sample_record()).unwrap();
    persist::clear(&mut store).unwrap();
    assert!(persist::load(&mut store).unwrap().is_none());
}

#[test]
fn test_file_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::new(dir.path().join("forms"));

    let mut record = sample_record();
    persist::save(&mut store, &mut record).unwrap();
    assert!(dir.path().join("forms").join("formBuilderData.json").exists());

    let config = persist::load_config(&mut store).unwrap().unwrap();
    assert_eq!(config, record.config);

    persist::clear(&mut store).unwrap();
    persist::clear(&mut store).unwrap();
    assert!(persist::load(&mut store).unwrap().is_none());
}
