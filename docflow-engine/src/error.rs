//! Engine error types

use docflow_core::domain::job::{JobId, JobStatus};

/// Record store backend failure
///
/// A store failure means the system cannot make progress on the affected
/// operation; it is always propagated, never swallowed.
#[derive(Debug)]
pub enum StoreError {
    Unavailable(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Unavailable(msg) => write!(f, "job store unavailable: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// Facade error type
#[derive(Debug)]
pub enum EngineError {
    /// No job record with this id
    NotFound(JobId),
    /// Cancellation requested for a job already in a terminal state.
    /// Expected race (double-click, cancel after completion), not a fault.
    CannotCancel { id: JobId, status: JobStatus },
    /// The queue is not accepting submissions (manager stopped)
    QueueUnavailable,
    Store(StoreError),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::NotFound(id) => write!(f, "job {} not found", id),
            EngineError::CannotCancel { id, status } => {
                write!(f, "cannot cancel job {} in state {}", id, status)
            }
            EngineError::QueueUnavailable => write!(f, "job queue is not running"),
            EngineError::Store(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        EngineError::Store(err)
    }
}
