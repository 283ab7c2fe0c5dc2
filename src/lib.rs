//! # linkstore
//!
//! Storage core of a URL shortener:
//! - Key/value store assigning dense numeric short keys
//! - Append-only JSON-lines log for durability, replayed on startup
//! - Owner-scoped soft deletes
//! - Background worker pool applying batch deletions
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Request handlers (external)                 │
//! └──────────────┬───────────────────────────────┬──────────────┘
//!                │ insert / get / list           │ enqueue
//!                │                               ▼
//!                │                      ┌─────────────────┐
//!                │                      │ DeletionWorker  │
//!                │                      │  (thread pool)  │
//!                │                      └────────┬────────┘
//!                ▼                               │ soft_delete
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Storage trait → KvStore                    │
//! │                        (RwLock)                             │
//! └──────────────────────────────┬──────────────────────────────┘
//!                                │ append (file backend)
//!                                ▼
//!                        ┌──────────────┐
//!                        │  Durable Log │
//!                        └──────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod log;
pub mod store;
pub mod worker;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{StoreError, Result};
pub use config::{Config, StorageBackend};
pub use record::Record;
pub use store::{open_storage, DeleteOutcome, KvStore, Storage};
pub use worker::{DeletionQueue, DeletionTask, DeletionWorker};
pub use engine::{Engine, Resolution};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of linkstore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
