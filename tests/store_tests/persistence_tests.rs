//! Tests for the file-backed store
//!
//! These tests verify:
//! - Reopening restores records and the key counter
//! - Soft deletes survive restarts
//! - Storage selection from config

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use linkstore::config::{Config, LogSyncStrategy, StorageBackend};
use linkstore::{open_storage, KvStore, Storage, StoreError};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_log() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("links.log");
    (temp_dir, log_path)
}

fn open(path: &PathBuf) -> KvStore {
    KvStore::open(path, LogSyncStrategy::EveryWrite).unwrap()
}

// =============================================================================
// Restart Tests
// =============================================================================

#[test]
fn test_open_empty_log() {
    let (_temp, log_path) = setup_temp_log();

    let store = open(&log_path);

    assert!(store.is_empty());
    assert_eq!(store.last_key(), 1);
    assert_eq!(store.backend_name(), "file");
    assert!(log_path.exists());
}

#[test]
fn test_records_survive_reopen() {
    let (_temp, log_path) = setup_temp_log();
    {
        let store = open(&log_path);
        store.insert("https://example.com/a", "user1").unwrap();
        store.insert("https://example.com/b", "user2").unwrap();
        store.close().unwrap();
    }

    let store = open(&log_path);

    assert_eq!(store.len(), 2);
    assert_eq!(store.get("2").unwrap().original_url, "https://example.com/a");
    assert_eq!(store.get("3").unwrap().owner_id, "user2");
}

#[test]
fn test_counter_resumes_after_highest_key() {
    let (_temp, log_path) = setup_temp_log();
    {
        let store = open(&log_path);
        for i in 0..5 {
            store.insert(&format!("https://example.com/{}", i), "u").unwrap();
        }
    }

    let store = open(&log_path);

    assert_eq!(store.last_key(), 6);
    assert_eq!(store.insert("https://example.com/next", "u").unwrap(), "7");
}

#[test]
fn test_counter_uses_highest_not_last_key() {
    let (_temp, log_path) = setup_temp_log();
    fs::write(
        &log_path,
        concat!(
            r#"{"Key":"40","UUID":"u","Value":"https://a","IsDeleted":false}"#,
            "\n",
            r#"{"Key":"7","UUID":"u","Value":"https://b","IsDeleted":false}"#,
            "\n",
        ),
    )
    .unwrap();

    let store = open(&log_path);

    assert_eq!(store.insert("https://c", "u").unwrap(), "41");
}

#[test]
fn test_soft_delete_survives_reopen() {
    let (_temp, log_path) = setup_temp_log();
    {
        let store = open(&log_path);
        let key = store.insert("https://example.com/a", "user1").unwrap();
        store.insert("https://example.com/b", "user1").unwrap();
        store
            .soft_delete(&BTreeSet::from([key]), "user1")
            .unwrap();
    }

    let store = open(&log_path);

    let record = store.get("2").unwrap();
    assert!(record.is_deleted);
    assert_eq!(record.original_url, "https://example.com/a");
    assert_eq!(store.get_by_owner("user1").unwrap().len(), 1);
    assert_eq!(store.len(), 2);
}

#[test]
fn test_skipped_delete_writes_nothing() {
    let (_temp, log_path) = setup_temp_log();
    let store = open(&log_path);
    let key = store.insert("https://example.com/a", "user1").unwrap();
    let before = fs::metadata(&log_path).unwrap().len();

    store.soft_delete(&BTreeSet::from([key]), "user2").unwrap();

    assert_eq!(fs::metadata(&log_path).unwrap().len(), before);
}

#[test]
fn test_corrupt_lines_do_not_block_open() {
    let (_temp, log_path) = setup_temp_log();
    fs::write(
        &log_path,
        concat!(
            "garbage\n",
            r#"{"Key":"2","UUID":"u","Value":"https://a"}"#,
            "\n",
            r#"{"Key":"3","#,
        ),
    )
    .unwrap();

    let store = open(&log_path);

    assert_eq!(store.len(), 1);
    assert_eq!(store.insert("https://b", "u").unwrap(), "3");
    drop(store);

    let store = open(&log_path);
    assert_eq!(store.get("3").unwrap().original_url, "https://b");
}

// =============================================================================
// Factory Tests
// =============================================================================

#[test]
fn test_open_storage_file_backend() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("data");
    let config = Config::builder().data_dir(&data_dir).build();

    let store = open_storage(&config).unwrap();
    store.insert("https://example.com", "u").unwrap();

    assert_eq!(store.backend_name(), "file");
    assert!(data_dir.join("links.log").exists());
}

#[test]
fn test_open_storage_memory_backend() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("data");
    let config = Config::builder()
        .backend(StorageBackend::Memory)
        .data_dir(&data_dir)
        .build();

    let store = open_storage(&config).unwrap();
    store.insert("https://example.com", "u").unwrap();

    assert_eq!(store.backend_name(), "memory");
    assert!(!data_dir.exists());
}

#[test]
fn test_open_storage_rejects_invalid_config() {
    let config = Config::builder()
        .backend(StorageBackend::Memory)
        .pool_size(0)
        .build();

    assert!(matches!(open_storage(&config), Err(StoreError::Config(_))));
}
