//! Engine Module
//!
//! Wires a configured store to its deletion worker.
//!
//! ## Responsibilities
//! - Build the storage variant named by the config
//! - Start and stop the deletion worker
//! - Expose the operations a request handler needs

use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::store::{open_storage, Storage};
use crate::worker::{DeletionQueue, DeletionTask, DeletionWorker, WorkerError, WorkerStats};

/// How a key resolves
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Live link; redirect to this URL
    Redirect(String),

    /// The owner deleted the link
    Gone,
}

/// A running store plus its deletion worker
pub struct Engine {
    config: Config,
    store: Arc<dyn Storage>,
    queue: DeletionQueue,
    worker: DeletionWorker,
}

impl Engine {
    /// Open the store and start the deletion worker
    pub fn open(config: Config) -> Result<Self> {
        let store = open_storage(&config)?;
        let (worker, queue) = DeletionWorker::spawn(Arc::clone(&store), &config.worker)?;

        Ok(Self {
            config,
            store,
            queue,
            worker,
        })
    }

    /// Open a file-backed engine under `path` with default settings
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().data_dir(path).build())
    }

    /// Shorten one URL
    pub fn shorten(&self, url: &str, owner_id: &str) -> Result<String> {
        self.store.insert(url, owner_id)
    }

    /// Shorten several URLs, keys in input order
    pub fn shorten_batch(&self, urls: &[String], owner_id: &str) -> Result<Vec<String>> {
        self.store.insert_batch(urls, owner_id)
    }

    /// Resolve a key for redirecting
    pub fn resolve(&self, key: &str) -> Result<Resolution> {
        let record = self.store.get(key)?;
        Ok(if record.is_deleted {
            Resolution::Gone
        } else {
            Resolution::Redirect(record.original_url)
        })
    }

    /// Queue a batch delete; returns once the task is accepted
    pub fn request_delete(&self, task: DeletionTask) -> std::result::Result<(), WorkerError> {
        self.queue.enqueue(task)
    }

    /// The shared store
    pub fn store(&self) -> &Arc<dyn Storage> {
        &self.store
    }

    /// A handle for submitting deletions from other threads
    pub fn queue(&self) -> DeletionQueue {
        self.queue.clone()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Drain pending deletions and stop the worker
    pub fn close(self) -> WorkerStats {
        self.worker.shutdown()
    }
}
