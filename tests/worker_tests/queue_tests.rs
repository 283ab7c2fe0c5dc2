//! Tests for DeletionQueue
//!
//! These tests verify:
//! - Backpressure when the queue is full
//! - Rejection after shutdown

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crossbeam::channel::{self, Receiver, Sender};
use linkstore::config::WorkerConfig;
use linkstore::worker::WorkerError;
use linkstore::{DeleteOutcome, DeletionTask, DeletionWorker, KvStore, Record, Storage};

/// Store whose deletes announce themselves and then wait for a permit
struct GatedStore {
    inner: KvStore,
    started: Sender<()>,
    permits: Receiver<()>,
}

impl Storage for GatedStore {
    fn insert(&self, url: &str, owner_id: &str) -> linkstore::Result<String> {
        self.inner.insert(url, owner_id)
    }

    fn insert_batch(&self, urls: &[String], owner_id: &str) -> linkstore::Result<Vec<String>> {
        self.inner.insert_batch(urls, owner_id)
    }

    fn get(&self, key: &str) -> linkstore::Result<Record> {
        self.inner.get(key)
    }

    fn get_by_owner(&self, owner_id: &str) -> linkstore::Result<HashMap<String, String>> {
        self.inner.get_by_owner(owner_id)
    }

    fn soft_delete(
        &self,
        keys: &BTreeSet<String>,
        owner_id: &str,
    ) -> linkstore::Result<DeleteOutcome> {
        self.started.send(()).unwrap();
        self.permits.recv().unwrap();
        self.inner.soft_delete(keys, owner_id)
    }

    fn ping(&self) -> linkstore::Result<()> {
        self.inner.ping()
    }

    fn backend_name(&self) -> &'static str {
        "gated"
    }
}

fn single_slot() -> WorkerConfig {
    WorkerConfig {
        queue_capacity: 1,
        pool_size: 1,
    }
}

#[test]
fn test_try_enqueue_reports_full_queue() {
    let (started_tx, started_rx) = channel::unbounded();
    let (permit_tx, permit_rx) = channel::unbounded();
    let store = Arc::new(GatedStore {
        inner: KvStore::in_memory(),
        started: started_tx,
        permits: permit_rx,
    });

    let (worker, queue) = DeletionWorker::spawn(store, &single_slot()).unwrap();

    // First task occupies the only thread
    queue.enqueue(DeletionTask::new(["2"], "u")).unwrap();
    started_rx.recv().unwrap();

    // Second fills the only slot
    queue.try_enqueue(DeletionTask::new(["3"], "u")).unwrap();
    assert_eq!(queue.pending(), 1);

    match queue.try_enqueue(DeletionTask::new(["4"], "u")) {
        Err(WorkerError::QueueFull(task)) => {
            assert_eq!(task.keys, BTreeSet::from(["4".to_string()]));
        }
        other => panic!("expected QueueFull, got {:?}", other),
    }

    permit_tx.send(()).unwrap();
    permit_tx.send(()).unwrap();
    let stats = worker.shutdown();

    assert_eq!(stats.tasks_completed, 2);
}

#[test]
fn test_enqueue_after_shutdown_is_rejected() {
    let store = Arc::new(KvStore::in_memory());
    let (worker, queue) = DeletionWorker::spawn(store, &single_slot()).unwrap();

    worker.shutdown();

    assert!(queue.is_closed());
    let err = queue.enqueue(DeletionTask::new(["2"], "u")).unwrap_err();
    assert!(matches!(err, WorkerError::Closed(_)));
    assert_eq!(err.into_task().owner_id, "u");
    assert!(matches!(
        queue.try_enqueue(DeletionTask::new(["2"], "u")),
        Err(WorkerError::Closed(_))
    ));
}

#[test]
fn test_task_keys_are_deduplicated() {
    let task = DeletionTask::new(["5", "2", "5"], "owner");

    assert_eq!(task.keys.len(), 2);
    assert_eq!(task.keys.iter().next().unwrap(), "2");
}
