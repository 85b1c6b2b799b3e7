//! Lookup worker pool
//!
//! Fixed-size pool of tokio tasks on the multi-thread runtime. Jobs are fed
//! through a bounded channel (capacity = worker count), so at most
//! `2 * worker_count` lookups are queued or in flight at once.
//!
//! Each worker lazily connects its own store on its first job and keeps it
//! for its lifetime. Workers collect results locally and hand them back when
//! they exit; nothing is merged until every worker has been joined.

use crate::error::LookupError;
use crate::store::{MetadataStore, ObjectMetadata, StoreConnector};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Log a progress line every this many completed lookups
const PROGRESS_INTERVAL: usize = 1000;

/// One lookup to perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupJob {
    /// Position in the submitted job list
    pub index: usize,
    /// Full object key
    pub key: String,
}

/// Outcome of one lookup
#[derive(Debug, Clone)]
pub struct LookupResult {
    pub index: usize,
    pub key: String,
    pub outcome: Result<ObjectMetadata, LookupError>,
}

struct Progress {
    total: usize,
    completed: AtomicUsize,
    failed: AtomicUsize,
}

impl Progress {
    fn record(&self, failed: bool) {
        if failed {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
        let current = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
        if current % PROGRESS_INTERVAL == 0 || current == self.total {
            info!(
                progress = format!("{}/{}", current, self.total),
                failed = self.failed.load(Ordering::Relaxed),
                "Lookup progress"
            );
        }
    }
}

/// Bounded pool of lookup workers
pub struct LookupPool<C: StoreConnector> {
    connector: Arc<C>,
    worker_count: usize,
    timeout: Option<Duration>,
}

impl<C: StoreConnector> LookupPool<C> {
    /// Create a pool; a worker count of 0 is treated as 1
    pub fn new(connector: C, worker_count: usize, timeout: Option<Duration>) -> Self {
        Self {
            connector: Arc::new(connector),
            worker_count: worker_count.max(1),
            timeout,
        }
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Run every job to completion and return results in job order
    ///
    /// Results of a worker that panics are lost; callers treat missing
    /// indices as failed lookups.
    pub async fn run(&self, jobs: Vec<LookupJob>) -> Vec<LookupResult> {
        let total = jobs.len();
        if total == 0 {
            return Vec::new();
        }

        let (job_tx, job_rx) = mpsc::channel::<LookupJob>(self.worker_count);
        let job_rx = Arc::new(Mutex::new(job_rx));
        let progress = Arc::new(Progress {
            total,
            completed: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
        });

        let mut workers = JoinSet::new();
        for worker_id in 0..self.worker_count {
            workers.spawn(worker_loop(
                worker_id,
                Arc::clone(&self.connector),
                Arc::clone(&job_rx),
                self.timeout,
                Arc::clone(&progress),
            ));
        }
        // Workers own the receiver from here on
        drop(job_rx);

        for job in jobs {
            if job_tx.send(job).await.is_err() {
                error!("All lookup workers exited before the queue drained");
                break;
            }
        }
        drop(job_tx);

        let mut results = Vec::with_capacity(total);
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(mut batch) => results.append(&mut batch),
                Err(e) => error!(error = %e, "Lookup worker terminated abnormally"),
            }
        }

        results.sort_by_key(|r| r.index);
        results
    }
}

async fn worker_loop<C: StoreConnector>(
    worker_id: usize,
    connector: Arc<C>,
    jobs: Arc<Mutex<mpsc::Receiver<LookupJob>>>,
    timeout: Option<Duration>,
    progress: Arc<Progress>,
) -> Vec<LookupResult> {
    let mut store: Option<C::Store> = None;
    let mut results = Vec::new();

    loop {
        let next = {
            let mut rx = jobs.lock().await;
            rx.recv().await
        };
        let Some(job) = next else {
            break;
        };

        info!(worker_id, "stat'ing {}", job.key);

        let outcome = match ensure_store(&mut store, connector.as_ref(), worker_id) {
            Ok(s) => lookup(s, &job.key, timeout).await,
            Err(e) => Err(e),
        };

        if let Err(e) = &outcome {
            warn!(worker_id, error = %e, "FAILED STAT {}", job.key);
        }
        progress.record(outcome.is_err());

        results.push(LookupResult {
            index: job.index,
            key: job.key,
            outcome,
        });
    }

    debug!(worker_id, processed = results.len(), "Worker finished");
    results
}

/// Connect on first use; a failed connect is retried on the next job
fn ensure_store<'a, C: StoreConnector>(
    slot: &'a mut Option<C::Store>,
    connector: &C,
    worker_id: usize,
) -> Result<&'a C::Store, LookupError> {
    if slot.is_none() {
        *slot = Some(connector.connect(worker_id)?);
    }
    slot.as_ref()
        .ok_or_else(|| LookupError::Connect(format!("worker {} has no store", worker_id)))
}

async fn lookup<S: MetadataStore>(
    store: &S,
    key: &str,
    timeout: Option<Duration>,
) -> Result<ObjectMetadata, LookupError> {
    match timeout {
        Some(after) => tokio::time::timeout(after, store.stat(key))
            .await
            .unwrap_or_else(|_| {
                Err(LookupError::Timeout {
                    key: key.to_string(),
                    after,
                })
            }),
        None => store.stat(key).await,
    }
}
