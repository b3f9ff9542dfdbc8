//! Worker executor loop
//!
//! Each worker claims job ids off the shared FIFO channel and drives the
//! record through the state machine. A failure inside one job is recorded
//! on that job and never escapes the loop; the store is the only state a
//! worker shares with the rest of the system.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use docflow_core::domain::job::{Job, JobId, JobStatus};
use docflow_core::domain::tier::AccountTier;
use tokio::sync::{Mutex, mpsc, watch};
use tracing::{debug, error, info, warn};

use crate::error::StoreError;
use crate::registry::{OperationRegistry, PostProcess, ProgressSender};
use crate::store::JobStore;

/// Shared dependencies for every worker in the pool
pub(crate) struct WorkerContext {
    pub store: Arc<dyn JobStore>,
    pub registry: Arc<OperationRegistry>,
    pub post_process: Option<Arc<dyn PostProcess>>,
    pub queue_depth: Arc<AtomicUsize>,
}

/// Runs one worker until shutdown is signalled or the queue closes
pub(crate) async fn run_worker(
    worker_id: usize,
    ctx: Arc<WorkerContext>,
    queue: Arc<Mutex<mpsc::UnboundedReceiver<JobId>>>,
    mut shutdown: watch::Receiver<bool>,
) {
    debug!("Worker {} started", worker_id);

    loop {
        let maybe_id = tokio::select! {
            _ = shutdown.changed() => break,
            id = async { queue.lock().await.recv().await } => id,
        };

        let Some(job_id) = maybe_id else {
            // Queue sender dropped: manager is stopping
            break;
        };

        ctx.queue_depth.fetch_sub(1, Ordering::SeqCst);

        if let Err(err) = process_job(&ctx, job_id).await {
            // Store failures only; operation failures are recorded on the job
            error!("Worker {} could not process job {}: {}", worker_id, job_id, err);
        }
    }

    debug!("Worker {} stopped", worker_id);
}

/// Drives a single claimed job id to a terminal state
async fn process_job(ctx: &WorkerContext, job_id: JobId) -> Result<(), StoreError> {
    // Re-read the record: it may have been cancelled or deleted while queued
    let Some(job) = ctx.store.find_by_id(job_id).await? else {
        warn!("Job {} vanished before processing, skipping", job_id);
        return Ok(());
    };

    if job.status != JobStatus::Pending {
        debug!(
            "Job {} is {} rather than pending, skipping",
            job_id, job.status
        );
        return Ok(());
    }

    // Claim. Losing the race here means a cancel landed first.
    if !ctx.store.mark_processing(job_id).await? {
        debug!("Job {} was cancelled before it could be claimed", job_id);
        return Ok(());
    }

    info!("Processing job {} ({})", job_id, job.kind);

    let Some(operation) = ctx.registry.get(job.kind) else {
        let detail = format!("no operation registered for kind '{}'", job.kind);
        error!("Job {} failed: {}", job_id, detail);
        ctx.store.fail(job_id, detail).await?;
        return Ok(());
    };

    // Persist every progress report as it arrives, not batched
    let (progress, mut updates) = ProgressSender::channel();
    let store = Arc::clone(&ctx.store);
    let forwarder = tokio::spawn(async move {
        while let Some(update) = updates.recv().await {
            let percent = if update.total_units == 0 {
                0
            } else {
                ((u64::from(update.completed_units) * 100) / u64::from(update.total_units)) as u8
            };
            if let Err(err) = store
                .update_progress(job_id, update.completed_units, percent)
                .await
            {
                warn!("Failed to persist progress for job {}: {}", job_id, err);
            }
        }
    });

    let result = operation
        .run(&job.input_files, &job.settings, progress)
        .await;

    // The operation's sender is gone; drain remaining reports before the
    // terminal write so progress updates stay totally ordered.
    if let Err(err) = forwarder.await {
        warn!("Progress forwarder for job {} panicked: {}", job_id, err);
    }

    match result {
        Ok(output_files) if output_files.is_empty() => {
            let detail = "operation produced no output files".to_string();
            error!("Job {} failed: {}", job_id, detail);
            ctx.store.fail(job_id, detail).await?;
        }
        Ok(output_files) => {
            run_post_process(ctx, &job, &output_files).await;

            if ctx.store.complete(job_id, output_files).await? {
                info!("Job {} completed successfully", job_id);
            } else {
                // Cancelled while the operation was in flight; the record
                // stays Cancelled, the finished work is simply discarded.
                info!("Job {} finished after cancellation, keeping cancelled status", job_id);
            }
        }
        Err(err) => {
            let detail = format!("{:#}", err);
            error!("Error processing job {}: {}", job_id, detail);
            if !ctx.store.fail(job_id, detail).await? {
                info!("Job {} failed after cancellation, keeping cancelled status", job_id);
            }
        }
    }

    Ok(())
}

/// Applies the configured post-processing hook to free-tier outputs
async fn run_post_process(ctx: &WorkerContext, job: &Job, output_files: &[String]) {
    let Some(hook) = &ctx.post_process else {
        return;
    };
    if job.tier != AccountTier::Free {
        return;
    }

    if let Err(err) = hook.apply(job, output_files).await {
        // The job still completes; the stamp is best-effort
        warn!("Post-processing for job {} failed: {:#}", job.id, err);
    }
}
