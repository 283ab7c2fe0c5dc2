//! Store Module
//!
//! The storage contract consumed by request handlers and the deletion
//! worker, plus the key/value implementation behind it.
//!
//! ## Variants
//! - `memory`: `KvStore` without a log, state is lost on restart
//! - `file`: `KvStore` journaling every mutation to the durable log
//!
//! A relational backend would implement the same `Storage` trait.

mod kv;

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::sync::Arc;

use crate::config::{Config, StorageBackend};
use crate::error::Result;
use crate::record::Record;

pub use kv::KvStore;

/// Storage contract shared by every backend
///
/// All methods take `&self`; implementations synchronize internally so a
/// single instance can be shared behind an `Arc`.
pub trait Storage: Send + Sync {
    /// Store `url` for `owner_id` and return its newly assigned key
    fn insert(&self, url: &str, owner_id: &str) -> Result<String>;

    /// Store several URLs for one owner, returning keys in input order
    fn insert_batch(&self, urls: &[String], owner_id: &str) -> Result<Vec<String>>;

    /// Look up a record by exact key, deleted or not
    ///
    /// # Errors
    ///
    /// `StoreError::NotFound` if the key was never assigned.
    fn get(&self, key: &str) -> Result<Record>;

    /// Live (non-deleted) links of one owner, key → URL
    fn get_by_owner(&self, owner_id: &str) -> Result<HashMap<String, String>>;

    /// Soft-delete the keys in `keys` that belong to `owner_id`
    ///
    /// Keys that are unknown or owned by someone else are reported in
    /// `DeleteOutcome::skipped`, they are not an error.
    fn soft_delete(&self, keys: &BTreeSet<String>, owner_id: &str) -> Result<DeleteOutcome>;

    /// Liveness probe of the backing service
    fn ping(&self) -> Result<()>;

    /// Short backend name for logs
    fn backend_name(&self) -> &'static str;
}

/// What a soft delete did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// Keys flipped to deleted by this call
    pub deleted: Vec<String>,

    /// Keys that do not exist or belong to another owner
    pub skipped: Vec<String>,
}

impl DeleteOutcome {
    pub fn deleted_count(&self) -> usize {
        self.deleted.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Build the storage variant selected by `config`
pub fn open_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    config.validate()?;

    let store = match config.backend {
        StorageBackend::Memory => KvStore::in_memory(),
        StorageBackend::File => {
            fs::create_dir_all(&config.data_dir)?;
            KvStore::open(&config.log_path(), config.log_sync_strategy)?
        }
    };

    tracing::info!("Using storage backend: {}", store.backend_name());
    Ok(Arc::new(store))
}
