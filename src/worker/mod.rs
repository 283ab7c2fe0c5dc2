//! Deletion Worker Module
//!
//! Applies batch soft-deletes off the request path.
//!
//! ## Architecture
//! ```text
//!   request handlers ──enqueue──▶ ┌──────────────────┐
//!   (DeletionQueue clones)        │ bounded channel  │
//!                                 └────────┬─────────┘
//!                        ┌─────────────────┼─────────────────┐
//!                        ▼                 ▼                 ▼
//!                 deletion-worker-0  deletion-worker-1  ... (pool_size)
//!                        │                 │                 │
//!                        └──────── Storage::soft_delete ─────┘
//! ```
//!
//! Requesters are answered before their task runs, so failures are only
//! logged. Shutdown closes the queue, drains every accepted task and joins
//! the pool.

mod task;
mod queue;
mod pool;

pub use task::DeletionTask;
pub use queue::{DeletionQueue, WorkerError};
pub use pool::{DeletionWorker, WorkerStats};
