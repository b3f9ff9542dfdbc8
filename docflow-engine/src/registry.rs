//! Operation Registry
//!
//! Maps a job kind to its work function. The registry replaces kind
//! dispatch by conditional chains: the worker never matches on `JobKind`,
//! it looks the operation up here.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use docflow_core::domain::job::{Job, JobKind, JobSettings};
use tokio::sync::mpsc;

/// Incremental progress report from a running operation
#[derive(Debug, Clone, Copy)]
pub struct ProgressUpdate {
    pub completed_units: u32,
    pub total_units: u32,
}

/// Handle an operation uses to report progress
///
/// Reports are forwarded to the owning worker and persisted immediately,
/// one by one, so pollers see near-real-time progress. Reporting never
/// blocks the operation; reports sent after the operation returns are
/// dropped.
#[derive(Clone)]
pub struct ProgressSender {
    tx: mpsc::UnboundedSender<ProgressUpdate>,
}

impl ProgressSender {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ProgressUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn report(&self, completed_units: u32, total_units: u32) {
        let _ = self.tx.send(ProgressUpdate {
            completed_units,
            total_units,
        });
    }

    /// A sender whose reports go nowhere (for operations run outside a worker)
    pub fn discard() -> Self {
        let (sender, _rx) = Self::channel();
        sender
    }
}

/// A pluggable work function
///
/// Operations are one-shot and stateless: given input file handles and the
/// job's settings bag, produce output file handles or an error. Failure is
/// part of the return contract; an operation must not panic to signal it.
#[async_trait]
pub trait Operation: Send + Sync {
    async fn run(
        &self,
        input_files: &[String],
        settings: &JobSettings,
        progress: ProgressSender,
    ) -> anyhow::Result<Vec<String>>;
}

/// Hook applied by a worker to a successful job's outputs before the
/// completing write. Used for the free-tier output stamp; premium jobs
/// skip it. A hook failure is logged and never fails the job.
#[async_trait]
pub trait PostProcess: Send + Sync {
    async fn apply(&self, job: &Job, output_files: &[String]) -> anyhow::Result<()>;
}

/// Kind -> work function lookup table
#[derive(Default)]
pub struct OperationRegistry {
    operations: HashMap<JobKind, Arc<dyn Operation>>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the work function for a kind, replacing any previous one
    pub fn register(&mut self, kind: JobKind, operation: Arc<dyn Operation>) {
        self.operations.insert(kind, operation);
    }

    pub fn get(&self, kind: JobKind) -> Option<Arc<dyn Operation>> {
        self.operations.get(&kind).cloned()
    }

    pub fn kinds(&self) -> Vec<JobKind> {
        self.operations.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopOperation;

    #[async_trait]
    impl Operation for NoopOperation {
        async fn run(
            &self,
            input_files: &[String],
            _settings: &JobSettings,
            progress: ProgressSender,
        ) -> anyhow::Result<Vec<String>> {
            progress.report(input_files.len() as u32, input_files.len() as u32);
            Ok(input_files.to_vec())
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = OperationRegistry::new();
        assert!(registry.is_empty());

        registry.register(JobKind::Merge, Arc::new(NoopOperation));
        assert_eq!(registry.len(), 1);
        assert!(registry.get(JobKind::Merge).is_some());
        assert!(registry.get(JobKind::Split).is_none());
    }

    #[tokio::test]
    async fn test_progress_reports_are_delivered_in_order() {
        let (sender, mut rx) = ProgressSender::channel();
        sender.report(1, 3);
        sender.report(2, 3);
        drop(sender);

        assert_eq!(rx.recv().await.unwrap().completed_units, 1);
        assert_eq!(rx.recv().await.unwrap().completed_units, 2);
        assert!(rx.recv().await.is_none());
    }
}
