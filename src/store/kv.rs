//! Key/Value Store
//!
//! In-memory record map with optional journaling to the durable log.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use parking_lot::RwLock;

use crate::config::LogSyncStrategy;
use crate::error::{Result, StoreError};
use crate::log::{fold, LogRecovery, LogWriter};
use crate::record::Record;

use super::{DeleteOutcome, Storage};

/// Counter value of a store with no recovered keys; the first key is "2"
const INITIAL_COUNTER: u64 = 1;

/// Key/value implementation of `Storage`
///
/// ## Concurrency
/// One `RwLock` guards the map, the key counter and the log writer:
/// - `get` / `get_by_owner` take the read lock and run concurrently
/// - `insert` / `insert_batch` / `soft_delete` take the write lock
///
/// Log appends happen while the write lock is held, so log order matches
/// the order in which mutations become visible.
pub struct KvStore {
    inner: RwLock<Inner>,
}

struct Inner {
    /// Every record ever inserted, deleted ones included
    records: HashMap<String, Record>,

    /// Last key handed out (or recovered)
    counter: u64,

    /// `None` for the memory backend
    log: Option<LogWriter>,
}

impl KvStore {
    /// Create an empty store that is never persisted
    pub fn in_memory() -> Self {
        Self {
            inner: RwLock::new(Inner {
                records: HashMap::new(),
                counter: INITIAL_COUNTER,
                log: None,
            }),
        }
    }

    /// Open a store journaled to the log at `path`
    ///
    /// On startup:
    /// 1. Replay the log, skipping unreadable lines
    /// 2. Fold records by key, last write wins
    /// 3. Resume the key counter above the highest recovered key
    /// 4. Keep the log open for appends
    pub fn open(path: &Path, sync_strategy: LogSyncStrategy) -> Result<Self> {
        let (records, recovery) = LogRecovery::recover(path)?;

        if recovery.entries_recovered > 0 || recovery.entries_corrupted > 0 {
            tracing::info!(
                "Log recovery: {} entries recovered, {} corrupted, highest key {:?}",
                recovery.entries_recovered,
                recovery.entries_corrupted,
                recovery.highest_key
            );
        }

        let records = fold(records);
        let counter = recovery
            .highest_key
            .map_or(INITIAL_COUNTER, |h| h.max(INITIAL_COUNTER));
        let log = LogWriter::open(path, sync_strategy)?;

        tracing::debug!("Opened {} with {} records", path.display(), records.len());

        Ok(Self {
            inner: RwLock::new(Inner {
                records,
                counter,
                log: Some(log),
            }),
        })
    }

    /// Number of records, deleted ones included
    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The most recently assigned (or recovered) key counter
    pub fn last_key(&self) -> u64 {
        self.inner.read().counter
    }

    /// Force pending log appends to disk
    pub fn sync(&self) -> Result<()> {
        if let Some(log) = self.inner.write().log.as_mut() {
            log.sync()?;
        }
        Ok(())
    }

    /// Close the store, syncing the log
    pub fn close(self) -> Result<()> {
        self.sync()
    }
}

impl Inner {
    /// Assign the next key to a new record
    ///
    /// The record is appended to the log before it is applied, so a failed
    /// append leaves the map and the counter unchanged.
    fn insert_record(&mut self, url: &str, owner_id: &str) -> Result<String> {
        let next = self
            .counter
            .checked_add(1)
            .ok_or(StoreError::KeySpaceExhausted)?;
        let record = Record::new(next.to_string(), owner_id, url);

        if let Some(log) = self.log.as_mut() {
            log.append(&record)?;
        }

        let key = record.key.clone();
        self.counter = next;
        self.records.insert(key.clone(), record);
        Ok(key)
    }
}

impl Storage for KvStore {
    fn insert(&self, url: &str, owner_id: &str) -> Result<String> {
        let key = self.inner.write().insert_record(url, owner_id)?;
        tracing::debug!("Inserted key {} for owner {}", key, owner_id);
        Ok(key)
    }

    fn insert_batch(&self, urls: &[String], owner_id: &str) -> Result<Vec<String>> {
        let mut inner = self.inner.write();
        let mut keys = Vec::with_capacity(urls.len());
        for url in urls {
            keys.push(inner.insert_record(url, owner_id)?);
        }
        tracing::debug!("Inserted batch of {} for owner {}", keys.len(), owner_id);
        Ok(keys)
    }

    fn get(&self, key: &str) -> Result<Record> {
        self.inner
            .read()
            .records
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    fn get_by_owner(&self, owner_id: &str) -> Result<HashMap<String, String>> {
        let inner = self.inner.read();
        Ok(inner
            .records
            .values()
            .filter(|r| !r.is_deleted && r.is_owned_by(owner_id))
            .map(|r| (r.key.clone(), r.original_url.clone()))
            .collect())
    }

    fn soft_delete(&self, keys: &BTreeSet<String>, owner_id: &str) -> Result<DeleteOutcome> {
        let mut guard = self.inner.write();
        let inner = &mut *guard;
        let mut outcome = DeleteOutcome::default();

        for key in keys {
            let updated = match inner.records.get(key) {
                Some(record) if record.is_owned_by(owner_id) => {
                    if record.is_deleted {
                        continue;
                    }
                    record.deleted()
                }
                _ => {
                    outcome.skipped.push(key.clone());
                    continue;
                }
            };

            if let Some(log) = inner.log.as_mut() {
                log.append(&updated)?;
            }
            inner.records.insert(key.clone(), updated);
            outcome.deleted.push(key.clone());
        }

        tracing::debug!(
            "Soft delete for owner {}: {} deleted, {} skipped",
            owner_id,
            outcome.deleted.len(),
            outcome.skipped.len()
        );
        Ok(outcome)
    }

    fn ping(&self) -> Result<()> {
        Err(StoreError::Unsupported(format!(
            "ping is not supported by the {} backend",
            self.backend_name()
        )))
    }

    fn backend_name(&self) -> &'static str {
        if self.inner.read().log.is_some() {
            "file"
        } else {
            "memory"
        }
    }
}

impl Default for KvStore {
    fn default() -> Self {
        Self::in_memory()
    }
}
