//! Queue Manager
//!
//! Facade over the job queue and worker pool: enqueue, cancel, status and
//! queue-health queries, plus idempotent lifecycle control. Constructed
//! explicitly by the composition root and shared behind an `Arc`; there is
//! no ambient global instance.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use docflow_core::domain::job::JobId;
use docflow_core::dto::job::{JobSnapshot, QueueHealth};
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::registry::{OperationRegistry, PostProcess};
use crate::store::{CancelOutcome, JobStore};
use crate::worker::{WorkerContext, run_worker};

/// Live pool state, present only between start() and stop()
struct RunningPool {
    submit_tx: mpsc::UnboundedSender<JobId>,
    shutdown_tx: watch::Sender<bool>,
    workers: Vec<JoinHandle<()>>,
}

pub struct QueueManager {
    store: Arc<dyn JobStore>,
    registry: Arc<OperationRegistry>,
    config: EngineConfig,
    post_process: Option<Arc<dyn PostProcess>>,
    queue_depth: Arc<AtomicUsize>,
    pool: Mutex<Option<RunningPool>>,
}

impl QueueManager {
    pub fn new(
        store: Arc<dyn JobStore>,
        registry: Arc<OperationRegistry>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            registry,
            config,
            post_process: None,
            queue_depth: Arc::new(AtomicUsize::new(0)),
            pool: Mutex::new(None),
        }
    }

    /// Installs the output post-processing hook (free-tier stamp)
    pub fn with_post_process(mut self, hook: Arc<dyn PostProcess>) -> Self {
        self.post_process = Some(hook);
        self
    }

    /// Starts the worker pool. Calling start() while running is a no-op.
    pub async fn start(&self) {
        let mut pool = self.pool.lock().await;
        if pool.is_some() {
            debug!("Queue manager already running");
            return;
        }

        let (submit_tx, submit_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let queue = Arc::new(Mutex::new(submit_rx));

        let ctx = Arc::new(WorkerContext {
            store: Arc::clone(&self.store),
            registry: Arc::clone(&self.registry),
            post_process: self.post_process.clone(),
            queue_depth: Arc::clone(&self.queue_depth),
        });

        let workers = (0..self.config.worker_count)
            .map(|worker_id| {
                tokio::spawn(run_worker(
                    worker_id,
                    Arc::clone(&ctx),
                    Arc::clone(&queue),
                    shutdown_rx.clone(),
                ))
            })
            .collect();

        *pool = Some(RunningPool {
            submit_tx,
            shutdown_tx,
            workers,
        });

        info!(
            "Queue manager started with {} workers",
            self.config.worker_count
        );
    }

    /// Stops the pool, waiting for in-flight jobs to finish.
    ///
    /// Queued-but-unclaimed ids are dropped; their records stay Pending.
    /// Calling stop() while stopped is a no-op.
    pub async fn stop(&self) {
        let taken = { self.pool.lock().await.take() };
        let Some(pool) = taken else {
            debug!("Queue manager already stopped");
            return;
        };

        let _ = pool.shutdown_tx.send(true);
        drop(pool.submit_tx);

        for handle in pool.workers {
            if let Err(err) = handle.await {
                warn!("Worker task panicked during shutdown: {}", err);
            }
        }

        self.queue_depth.store(0, Ordering::SeqCst);
        info!("Queue manager stopped");
    }

    /// Enqueues an already-persisted Pending job.
    ///
    /// Never waits on worker availability: the id is queued instantly, or
    /// this fails with `QueueUnavailable` when the manager is stopped.
    pub async fn submit(&self, job_id: JobId) -> Result<(), EngineError> {
        let pool = self.pool.lock().await;
        let Some(pool) = pool.as_ref() else {
            return Err(EngineError::QueueUnavailable);
        };

        // Count the id before it becomes visible to workers; a dequeue may
        // decrement immediately, and the gauge must never wrap below zero.
        self.queue_depth.fetch_add(1, Ordering::SeqCst);
        if pool.submit_tx.send(job_id).is_err() {
            self.queue_depth.fetch_sub(1, Ordering::SeqCst);
            return Err(EngineError::QueueUnavailable);
        }

        info!("Job {} added to queue", job_id);
        Ok(())
    }

    /// Cancels a Pending or Processing job.
    ///
    /// Record-level only: an in-flight operation is not preempted, its
    /// eventual terminal write simply loses against the cancelled status.
    pub async fn cancel(&self, job_id: JobId) -> Result<(), EngineError> {
        match self.store.cancel(job_id).await? {
            CancelOutcome::Cancelled => {
                info!("Job {} cancelled", job_id);
                Ok(())
            }
            CancelOutcome::AlreadyTerminal(status) => {
                Err(EngineError::CannotCancel { id: job_id, status })
            }
            CancelOutcome::NotFound => Err(EngineError::NotFound(job_id)),
        }
    }

    /// Read-only snapshot of a job record
    pub async fn status_of(&self, job_id: JobId) -> Result<JobSnapshot, EngineError> {
        let job = self
            .store
            .find_by_id(job_id)
            .await?
            .ok_or(EngineError::NotFound(job_id))?;
        Ok(job.into())
    }

    /// Diagnostic surface; not used for control decisions
    pub async fn queue_health(&self) -> QueueHealth {
        QueueHealth {
            queue_depth: self.queue_depth.load(Ordering::SeqCst),
            is_running: self.pool.lock().await.is_some(),
            worker_count: self.config.worker_count,
        }
    }

    pub async fn is_running(&self) -> bool {
        self.pool.lock().await.is_some()
    }
}
