//! Configuration for linkstore
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{Result, StoreError};

/// Main configuration for a linkstore instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Which `Storage` implementation to construct
    pub backend: StorageBackend,

    /// Root directory for data files (file backend only)
    /// Internal structure:
    ///   {data_dir}/
    ///     └── links.log        (durable log)
    pub data_dir: PathBuf,

    // -------------------------------------------------------------------------
    // Durable Log Configuration
    // -------------------------------------------------------------------------
    /// Sync strategy: how often to fsync the log
    pub log_sync_strategy: LogSyncStrategy,

    // -------------------------------------------------------------------------
    // Deletion Worker Configuration
    // -------------------------------------------------------------------------
    pub worker: WorkerConfig,
}

/// Storage variant selected at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Purely in-memory, lost on restart
    Memory,

    /// In-memory map journaled to `{data_dir}/links.log`
    File,
}

/// Log sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSyncStrategy {
    /// fsync after every append (crash-safe)
    EveryWrite,

    /// fsync after N unsynced appends
    EveryNEntries { count: usize },
}

/// Sizing of the background deletion worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerConfig {
    /// Deletion tasks that may wait in the queue before `enqueue` blocks
    pub queue_capacity: usize,

    /// Number of threads applying soft-deletes concurrently
    pub pool_size: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 10,
            pool_size: 4,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            data_dir: PathBuf::from("./linkstore_data"),
            log_sync_strategy: LogSyncStrategy::EveryWrite,
            worker: WorkerConfig::default(),
        }
    }
}

impl Config {
    const LOG_FILENAME: &'static str = "links.log";

    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Path of the durable log inside `data_dir`
    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(Self::LOG_FILENAME)
    }

    /// Reject settings the store and worker cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.worker.queue_capacity == 0 {
            return Err(StoreError::Config(
                "worker queue capacity must be at least 1".to_string(),
            ));
        }
        if self.worker.pool_size == 0 {
            return Err(StoreError::Config(
                "worker pool size must be at least 1".to_string(),
            ));
        }
        if let LogSyncStrategy::EveryNEntries { count: 0 } = self.log_sync_strategy {
            return Err(StoreError::Config(
                "log sync interval must be at least 1 entry".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Select the storage backend
    pub fn backend(mut self, backend: StorageBackend) -> Self {
        self.config.backend = backend;
        self
    }

    /// Set the data directory (root for all storage)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the log sync strategy
    pub fn log_sync_strategy(mut self, strategy: LogSyncStrategy) -> Self {
        self.config.log_sync_strategy = strategy;
        self
    }

    /// Set the deletion queue capacity
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.worker.queue_capacity = capacity;
        self
    }

    /// Set the number of deletion worker threads
    pub fn pool_size(mut self, size: usize) -> Self {
        self.config.worker.pool_size = size;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
