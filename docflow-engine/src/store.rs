//! Job Record Store
//!
//! Handles all persistence operations related to jobs. Every state-machine
//! guard lives here so that any backend upholds the same invariants:
//! transitions are monotonic, terminal states are final, and incremental
//! progress never reaches 100 before the completing write.

use std::collections::HashMap;

use async_trait::async_trait;
use docflow_core::domain::job::{Job, JobId, JobStatus};
use tokio::sync::RwLock;

use crate::error::StoreError;

/// Outcome of a cancellation write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The job was Pending or Processing and is now Cancelled
    Cancelled,
    /// The job already reached a terminal state; its status is untouched
    AlreadyTerminal(JobStatus),
    NotFound,
}

/// Persistence seam for job records
///
/// The API layer reads concurrently at any time and performs the single
/// cancel write; the worker that claimed a job performs every other write.
/// Terminal writes racing a cancellation are resolved here: a write into a
/// record that is already terminal is a no-op reported via the `bool`
/// returns.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn create(&self, job: Job) -> Result<(), StoreError>;

    async fn find_by_id(&self, id: JobId) -> Result<Option<Job>, StoreError>;

    /// Claim: Pending -> Processing, setting `started_at`.
    ///
    /// Returns false when the job is no longer Pending (cancelled before
    /// the worker got to it, or gone).
    async fn mark_processing(&self, id: JobId) -> Result<bool, StoreError>;

    /// Persist an incremental progress report.
    ///
    /// Applied only while Processing. Progress and completed units are
    /// clamped non-decreasing, and progress is capped at 99; 100 is written
    /// exclusively by `complete`.
    async fn update_progress(
        &self,
        id: JobId,
        completed_units: u32,
        progress: u8,
    ) -> Result<(), StoreError>;

    /// Processing -> Completed, writing outputs, progress 100 and
    /// `completed_at`. Returns false (no-op) when the job is not
    /// Processing: never claimed, or already terminal.
    async fn complete(&self, id: JobId, output_files: Vec<String>) -> Result<bool, StoreError>;

    /// Processing -> Failed, writing `error_detail` and `completed_at`.
    /// Returns false (no-op) when the job is not Processing.
    async fn fail(&self, id: JobId, error_detail: String) -> Result<bool, StoreError>;

    /// Pending | Processing -> Cancelled, setting `completed_at`.
    async fn cancel(&self, id: JobId) -> Result<CancelOutcome, StoreError>;

    /// Administrative cleanup; the worker pool never deletes records.
    async fn delete(&self, id: JobId) -> Result<bool, StoreError>;

    /// Records for one owner, most recent first
    async fn list_for_owner(&self, owner: &str) -> Result<Vec<Job>, StoreError>;

    async fn count(&self) -> Result<usize, StoreError>;
}

/// In-memory store
///
/// The record's last known status survives only as long as the process;
/// cross-restart durability is a backend concern behind the same trait.
#[derive(Default)]
pub struct MemoryJobStore {
    jobs: RwLock<HashMap<JobId, Job>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn create(&self, job: Job) -> Result<(), StoreError> {
        self.jobs.write().await.insert(job.id, job);
        Ok(())
    }

    async fn find_by_id(&self, id: JobId) -> Result<Option<Job>, StoreError> {
        Ok(self.jobs.read().await.get(&id).cloned())
    }

    async fn mark_processing(&self, id: JobId) -> Result<bool, StoreError> {
        let mut jobs = self.jobs.write().await;
        match jobs.get_mut(&id) {
            Some(job) if job.status == JobStatus::Pending => {
                job.status = JobStatus::Processing;
                job.started_at = Some(chrono::Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn update_progress(
        &self,
        id: JobId,
        completed_units: u32,
        progress: u8,
    ) -> Result<(), StoreError> {
        let mut jobs = self.jobs.write().await;
        if let Some(job) = jobs.get_mut(&id) {
            if job.status == JobStatus::Processing {
                job.completed_units = job.completed_units.max(completed_units);
                job.progress = job.progress.max(progress.min(99));
            }
        }
        Ok(())
    }

    async fn complete(&self, id: JobId, output_files: Vec<String>) -> Result<bool, StoreError> {
        let mut jobs = self.jobs.write().await;
        match jobs.get_mut(&id) {
            Some(job) if job.status.can_transition_to(JobStatus::Completed) => {
                job.status = JobStatus::Completed;
                job.output_files = output_files;
                job.progress = 100;
                job.completed_units = job.total_units;
                job.completed_at = Some(chrono::Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn fail(&self, id: JobId, error_detail: String) -> Result<bool, StoreError> {
        let mut jobs = self.jobs.write().await;
        match jobs.get_mut(&id) {
            Some(job) if job.status.can_transition_to(JobStatus::Failed) => {
                job.status = JobStatus::Failed;
                job.error_detail = Some(error_detail);
                job.completed_at = Some(chrono::Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn cancel(&self, id: JobId) -> Result<CancelOutcome, StoreError> {
        let mut jobs = self.jobs.write().await;
        match jobs.get_mut(&id) {
            Some(job) if !job.status.is_terminal() => {
                job.status = JobStatus::Cancelled;
                job.completed_at = Some(chrono::Utc::now());
                Ok(CancelOutcome::Cancelled)
            }
            Some(job) => Ok(CancelOutcome::AlreadyTerminal(job.status)),
            None => Ok(CancelOutcome::NotFound),
        }
    }

    async fn delete(&self, id: JobId) -> Result<bool, StoreError> {
        Ok(self.jobs.write().await.remove(&id).is_some())
    }

    async fn list_for_owner(&self, owner: &str) -> Result<Vec<Job>, StoreError> {
        let jobs = self.jobs.read().await;
        let mut owned: Vec<Job> = jobs.values().filter(|j| j.owner == owner).cloned().collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.jobs.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docflow_core::domain::job::{JobKind, JobSettings};
    use docflow_core::domain::tier::AccountTier;

    fn sample_job() -> Job {
        Job::new(
            "user-1",
            AccountTier::Free,
            JobKind::Merge,
            vec!["a.pdf".to_string(), "b.pdf".to_string()],
            JobSettings::new(),
        )
    }

    #[tokio::test]
    async fn test_claim_sets_started_at() {
        let store = MemoryJobStore::new();
        let job = sample_job();
        let id = job.id;
        store.create(job).await.unwrap();

        assert!(store.mark_processing(id).await.unwrap());
        let job = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Processing);
        assert!(job.started_at.is_some());

        // A second claim must fail: the job is no longer Pending
        assert!(!store.mark_processing(id).await.unwrap());
    }

    #[tokio::test]
    async fn test_claim_missing_job() {
        let store = MemoryJobStore::new();
        assert!(!store.mark_processing(uuid::Uuid::new_v4()).await.unwrap());
    }

    #[tokio::test]
    async fn test_progress_is_monotonic_and_capped() {
        let store = MemoryJobStore::new();
        let job = sample_job();
        let id = job.id;
        store.create(job).await.unwrap();
        store.mark_processing(id).await.unwrap();

        store.update_progress(id, 1, 50).await.unwrap();
        // A stale lower report must not regress the record
        store.update_progress(id, 0, 10).await.unwrap();
        let job = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(job.progress, 50);
        assert_eq!(job.completed_units, 1);

        // 100 is reserved for the completing write
        store.update_progress(id, 2, 100).await.unwrap();
        let job = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(job.progress, 99);
    }

    #[tokio::test]
    async fn test_progress_ignored_before_claim() {
        let store = MemoryJobStore::new();
        let job = sample_job();
        let id = job.id;
        store.create(job).await.unwrap();

        store.update_progress(id, 1, 50).await.unwrap();
        let job = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(job.progress, 0);
    }

    #[tokio::test]
    async fn test_complete_writes_outputs_and_progress() {
        let store = MemoryJobStore::new();
        let job = sample_job();
        let id = job.id;
        store.create(job).await.unwrap();
        store.mark_processing(id).await.unwrap();

        assert!(
            store
                .complete(id, vec!["out.pdf".to_string()])
                .await
                .unwrap()
        );
        let job = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.progress, 100);
        assert_eq!(job.completed_units, job.total_units);
        assert_eq!(job.output_files, vec!["out.pdf".to_string()]);
        assert!(job.completed_at.is_some());
    }

    #[tokio::test]
    async fn test_terminal_writes_require_a_claim() {
        let store = MemoryJobStore::new();
        let job = sample_job();
        let id = job.id;
        store.create(job).await.unwrap();

        // A never-claimed job cannot jump straight to a terminal state
        assert!(!store.complete(id, vec!["out.pdf".to_string()]).await.unwrap());
        assert!(!store.fail(id, "boom".to_string()).await.unwrap());

        let job = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Pending);
        assert!(job.started_at.is_none());
        assert!(job.completed_at.is_none());
        assert!(job.output_files.is_empty());
        assert!(job.error_detail.is_none());
    }

    #[tokio::test]
    async fn test_terminal_write_after_cancel_is_noop() {
        let store = MemoryJobStore::new();
        let job = sample_job();
        let id = job.id;
        store.create(job).await.unwrap();
        store.mark_processing(id).await.unwrap();

        assert_eq!(store.cancel(id).await.unwrap(), CancelOutcome::Cancelled);

        // The worker's own terminal writes lose the race and change nothing
        assert!(!store.complete(id, vec!["out.pdf".to_string()]).await.unwrap());
        assert!(!store.fail(id, "boom".to_string()).await.unwrap());

        let job = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Cancelled);
        assert!(job.output_files.is_empty());
        assert!(job.error_detail.is_none());
    }

    #[tokio::test]
    async fn test_cancel_after_complete_is_rejected() {
        let store = MemoryJobStore::new();
        let job = sample_job();
        let id = job.id;
        store.create(job).await.unwrap();
        store.mark_processing(id).await.unwrap();
        store.complete(id, vec!["out.pdf".to_string()]).await.unwrap();

        assert_eq!(
            store.cancel(id).await.unwrap(),
            CancelOutcome::AlreadyTerminal(JobStatus::Completed)
        );
        let job = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Completed);
    }

    #[tokio::test]
    async fn test_cancel_pending_job() {
        let store = MemoryJobStore::new();
        let job = sample_job();
        let id = job.id;
        store.create(job).await.unwrap();

        assert_eq!(store.cancel(id).await.unwrap(), CancelOutcome::Cancelled);
        let job = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Cancelled);
        assert!(job.started_at.is_none());
        assert!(job.completed_at.is_some());
    }

    #[tokio::test]
    async fn test_cancel_unknown_job() {
        let store = MemoryJobStore::new();
        assert_eq!(
            store.cancel(uuid::Uuid::new_v4()).await.unwrap(),
            CancelOutcome::NotFound
        );
    }

    #[tokio::test]
    async fn test_fail_records_detail() {
        let store = MemoryJobStore::new();
        let job = sample_job();
        let id = job.id;
        store.create(job).await.unwrap();
        store.mark_processing(id).await.unwrap();

        assert!(store.fail(id, "corrupt input".to_string()).await.unwrap());
        let job = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error_detail.as_deref(), Some("corrupt input"));
        assert!(job.output_files.is_empty());
    }

    #[tokio::test]
    async fn test_list_for_owner_most_recent_first() {
        let store = MemoryJobStore::new();
        let mut first = sample_job();
        first.created_at = chrono::Utc::now() - chrono::Duration::seconds(10);
        let mut other = sample_job();
        other.owner = "user-2".to_string();
        let second = sample_job();

        let (first_id, second_id) = (first.id, second.id);
        store.create(first).await.unwrap();
        store.create(other).await.unwrap();
        store.create(second).await.unwrap();

        let owned = store.list_for_owner("user-1").await.unwrap();
        assert_eq!(owned.len(), 2);
        assert_eq!(owned[0].id, second_id);
        assert_eq!(owned[1].id, first_id);
        assert_eq!(store.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryJobStore::new();
        let job = sample_job();
        let id = job.id;
        store.create(job).await.unwrap();

        assert!(store.delete(id).await.unwrap());
        assert!(!store.delete(id).await.unwrap());
        assert!(store.find_by_id(id).await.unwrap().is_none());
    }
}
