//! Deletion Queue
//!
//! Producer handle for the bounded task channel.

use std::sync::Arc;

use crossbeam::channel::{Sender, TrySendError};
use parking_lot::RwLock;
use thiserror::Error;

use super::DeletionTask;

/// Why a task was not accepted; the task is handed back
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("deletion queue is full")]
    QueueFull(DeletionTask),

    #[error("deletion worker is shut down")]
    Closed(DeletionTask),
}

impl WorkerError {
    /// Recover the rejected task
    pub fn into_task(self) -> DeletionTask {
        match self {
            WorkerError::QueueFull(task) | WorkerError::Closed(task) => task,
        }
    }
}

/// Cloneable handle used by request handlers to submit deletions
///
/// All clones share one sender. Closing drops it, which lets the pool
/// drain what is already queued and then stop.
#[derive(Clone)]
pub struct DeletionQueue {
    sender: Arc<RwLock<Option<Sender<DeletionTask>>>>,
}

impl DeletionQueue {
    pub(super) fn new(sender: Sender<DeletionTask>) -> Self {
        Self {
            sender: Arc::new(RwLock::new(Some(sender))),
        }
    }

    /// Submit a task, blocking while the queue is full
    pub fn enqueue(&self, task: DeletionTask) -> Result<(), WorkerError> {
        let sender = self.sender.read();
        match sender.as_ref() {
            Some(tx) => tx.send(task).map_err(|e| WorkerError::Closed(e.into_inner())),
            None => Err(WorkerError::Closed(task)),
        }
    }

    /// Submit a task without blocking
    pub fn try_enqueue(&self, task: DeletionTask) -> Result<(), WorkerError> {
        let sender = self.sender.read();
        match sender.as_ref() {
            Some(tx) => tx.try_send(task).map_err(|e| match e {
                TrySendError::Full(task) => WorkerError::QueueFull(task),
                TrySendError::Disconnected(task) => WorkerError::Closed(task),
            }),
            None => Err(WorkerError::Closed(task)),
        }
    }

    /// Tasks waiting to be picked up
    pub fn pending(&self) -> usize {
        self.sender.read().as_ref().map_or(0, |tx| tx.len())
    }

    pub fn is_closed(&self) -> bool {
        self.sender.read().is_none()
    }

    /// Stop accepting tasks
    ///
    /// Waits for in-progress `enqueue` calls to finish, so every task
    /// accepted before this returns will still be processed.
    pub(super) fn close(&self) {
        self.sender.write().take();
    }
}
