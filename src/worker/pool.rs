//! Deletion worker pool
//!
//! Fixed set of threads pulling tasks from the shared queue.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Receiver};

use crate::config::WorkerConfig;
use crate::error::{Result, StoreError};
use crate::store::Storage;

use super::{DeletionQueue, DeletionTask};

/// Counters reported by the worker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    /// Tasks whose soft delete returned Ok
    pub tasks_completed: u64,

    /// Tasks whose soft delete returned an error
    pub tasks_failed: u64,

    /// Keys flipped to deleted across all tasks
    pub keys_deleted: u64,
}

#[derive(Default)]
struct Counters {
    tasks_completed: AtomicU64,
    tasks_failed: AtomicU64,
    keys_deleted: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> WorkerStats {
        WorkerStats {
            tasks_completed: self.tasks_completed.load(Ordering::SeqCst),
            tasks_failed: self.tasks_failed.load(Ordering::SeqCst),
            keys_deleted: self.keys_deleted.load(Ordering::SeqCst),
        }
    }
}

/// Background pool applying `DeletionTask`s to a store
///
/// In-flight deletions are bounded by `pool_size`, queued ones by
/// `queue_capacity`. Dropping the worker shuts it down the same way as
/// `shutdown`.
pub struct DeletionWorker {
    queue: DeletionQueue,
    handles: Vec<JoinHandle<()>>,
    counters: Arc<Counters>,
}

impl DeletionWorker {
    /// Start the pool and return it with the queue that feeds it
    pub fn spawn(
        store: Arc<dyn Storage>,
        config: &WorkerConfig,
    ) -> Result<(Self, DeletionQueue)> {
        if config.queue_capacity == 0 || config.pool_size == 0 {
            return Err(StoreError::Config(format!(
                "invalid deletion worker sizing: {:?}",
                config
            )));
        }

        let (tx, rx) = channel::bounded(config.queue_capacity);
        let queue = DeletionQueue::new(tx);
        let counters = Arc::new(Counters::default());

        let mut worker = Self {
            queue: queue.clone(),
            handles: Vec::with_capacity(config.pool_size),
            counters: Arc::clone(&counters),
        };

        for id in 0..config.pool_size {
            let store = Arc::clone(&store);
            let rx = rx.clone();
            let counters = Arc::clone(&counters);
            // On failure `worker` is dropped, which closes the queue and
            // joins the threads already started.
            let handle = thread::Builder::new()
                .name(format!("deletion-worker-{}", id))
                .spawn(move || run(id, store, rx, counters))?;
            worker.handles.push(handle);
        }

        tracing::info!(
            "Deletion worker started: {} threads, queue capacity {}",
            config.pool_size,
            config.queue_capacity
        );

        Ok((worker, queue))
    }

    /// Counters so far
    pub fn stats(&self) -> WorkerStats {
        self.counters.snapshot()
    }

    /// Stop accepting tasks, finish every queued one, and join the pool
    pub fn shutdown(mut self) -> WorkerStats {
        self.stop();
        self.counters.snapshot()
    }

    fn stop(&mut self) {
        if self.handles.is_empty() {
            return;
        }
        tracing::info!("Deletion worker shutting down, {} tasks queued", self.queue.pending());
        self.queue.close();

        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                tracing::error!("Deletion worker thread panicked");
            }
        }

        let stats = self.counters.snapshot();
        tracing::info!(
            "Deletion worker stopped: {} completed, {} failed, {} keys deleted",
            stats.tasks_completed,
            stats.tasks_failed,
            stats.keys_deleted
        );
    }
}

impl Drop for DeletionWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Pull tasks until the queue is closed and empty
fn run(id: usize, store: Arc<dyn Storage>, rx: Receiver<DeletionTask>, counters: Arc<Counters>) {
    tracing::debug!("deletion-worker-{} started", id);

    for task in rx.iter() {
        match store.soft_delete(&task.keys, &task.owner_id) {
            Ok(outcome) => {
                counters.tasks_completed.fetch_add(1, Ordering::SeqCst);
                counters
                    .keys_deleted
                    .fetch_add(outcome.deleted.len() as u64, Ordering::SeqCst);
                if !outcome.skipped.is_empty() {
                    tracing::debug!(
                        "Owner {} may not delete {:?}, skipped",
                        task.owner_id,
                        outcome.skipped
                    );
                }
            }
            Err(e) => {
                counters.tasks_failed.fetch_add(1, Ordering::SeqCst);
                tracing::warn!(
                    "Soft delete of {} keys for owner {} failed: {}",
                    task.keys.len(),
                    task.owner_id,
                    e
                );
            }
        }
    }

    tracing::debug!("deletion-worker-{} stopped", id);
}
