use std::sync::Arc;
use std::thread::JoinHandle;

use chrono::{DateTime, Utc};
use crossbeam::channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::Mutex;
use tracing::{error, warn};

use crate::core::error::Result;
use crate::core::types::{EntityId, Item, Listing};

/// A write to mirror into the relational system of record.
#[derive(Debug, Clone)]
pub enum PersistTask {
    UpsertItems(Vec<Item>),
    UpsertListings(Vec<Listing>),
    StockDecrement { id: EntityId },
}

impl PersistTask {
    fn name(&self) -> &'static str {
        match self {
            PersistTask::UpsertItems(_) => "upsert_items",
            PersistTask::UpsertListings(_) => "upsert_listings",
            PersistTask::StockDecrement { .. } => "stock_decrement",
        }
    }
}

#[derive(Debug)]
struct QueuedTask {
    task: PersistTask,
    queued_at: DateTime<Utc>,
}

/// Write-side collaborator boundary of the relational store. The relay only
/// ever issues inserts and stock updates; the core never reads from the
/// relational store on the hot path.
pub trait RelationalStore: Send + Sync {
    fn insert_items(&self, rows: &[Item]) -> Result<()>;
    fn insert_listings(&self, rows: &[Listing]) -> Result<()>;
    fn decrement_stock(&self, id: EntityId) -> Result<()>;
}

/// Asynchronous best-effort mirror of index-confirmed writes into the
/// relational store: a bounded queue drained by one detached worker.
/// Enqueueing never blocks the request path (a full queue drops the task)
/// and worker failures never surface to the caller that triggered them; the
/// relational store stays diverged until the next full bulk reload.
pub struct PersistenceRelay {
    tx: Mutex<Option<Sender<QueuedTask>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl PersistenceRelay {
    pub fn spawn(store: Arc<dyn RelationalStore>, queue_capacity: usize) -> Self {
        let (tx, rx) = bounded(queue_capacity);
        let worker = std::thread::spawn(move || worker_loop(rx, store));
        PersistenceRelay {
            tx: Mutex::new(Some(tx)),
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Hand a task to the worker, fire-and-forget.
    pub fn enqueue(&self, task: PersistTask) {
        let queued = QueuedTask {
            task,
            queued_at: Utc::now(),
        };
        let tx = self.tx.lock();
        let Some(tx) = tx.as_ref() else {
            warn!(task = queued.task.name(), "persistence relay closed, dropping task");
            return;
        };
        match tx.try_send(queued) {
            Ok(()) => {}
            Err(TrySendError::Full(dropped)) => {
                warn!(task = dropped.task.name(), "persistence queue full, dropping task");
            }
            Err(TrySendError::Disconnected(dropped)) => {
                warn!(task = dropped.task.name(), "persistence worker gone, dropping task");
            }
        }
    }

    /// Drain the queue and stop the worker. Every task enqueued before the
    /// call has been dispatched once this returns; used by embedders at
    /// shutdown and by tests as the deterministic reconciliation point.
    pub fn close(&self) {
        let sender = self.tx.lock().take();
        drop(sender);
        if let Some(worker) = self.worker.lock().take() {
            let _ = worker.join();
        }
    }
}

impl Drop for PersistenceRelay {
    fn drop(&mut self) {
        self.close();
    }
}

fn worker_loop(rx: Receiver<QueuedTask>, store: Arc<dyn RelationalStore>) {
    for queued in rx.iter() {
        let outcome = match &queued.task {
            PersistTask::UpsertItems(rows) => store.insert_items(rows),
            PersistTask::UpsertListings(rows) => store.insert_listings(rows),
            PersistTask::StockDecrement { id } => store.decrement_stock(*id),
        };
        if let Err(e) = outcome {
            let age_ms = (Utc::now() - queued.queued_at).num_milliseconds();
            error!(
                task = queued.task.name(),
                age_ms, "relational mirror write failed: {}", e
            );
        }
    }
}
