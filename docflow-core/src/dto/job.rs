//! Job DTOs

use serde::{Deserialize, Serialize};

use crate::domain::job::{Job, JobId, JobKind, JobSettings, JobStatus};
use crate::domain::tier::AccountTier;

/// Request to create a new job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateJobRequest {
    pub owner: String,
    pub tier: AccountTier,
    pub kind: JobKind,
    pub input_files: Vec<String>,
    #[serde(default)]
    pub settings: JobSettings,
}

/// Read-only view of a job record for status polling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub id: JobId,
    pub kind: JobKind,
    pub status: JobStatus,
    pub progress: u8,
    pub total_units: u32,
    pub completed_units: u32,
    pub output_files: Vec<String>,
    pub error_detail: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<Job> for JobSnapshot {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            kind: job.kind,
            status: job.status,
            progress: job.progress,
            total_units: job.total_units,
            completed_units: job.completed_units,
            output_files: job.output_files,
            error_detail: job.error_detail,
            created_at: job.created_at,
            started_at: job.started_at,
            completed_at: job.completed_at,
        }
    }
}

/// Aggregate queue diagnostics
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QueueHealth {
    pub queue_depth: usize,
    pub is_running: bool,
    pub worker_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_conversion() {
        let job = Job::new(
            "user-1",
            AccountTier::Premium,
            JobKind::Compress,
            vec!["in.pdf".to_string()],
            JobSettings::new(),
        );

        let snapshot: JobSnapshot = job.clone().into();
        assert_eq!(snapshot.id, job.id);
        assert_eq!(snapshot.status, JobStatus::Pending);
        assert_eq!(snapshot.total_units, 1);
        assert!(snapshot.output_files.is_empty());
    }

    #[test]
    fn test_create_request_settings_default() {
        let req: CreateJobRequest = serde_json::from_str(
            r#"{"owner":"u","tier":"free","kind":"merge","input_files":["a.pdf"]}"#,
        )
        .unwrap();
        assert!(req.settings.is_empty());
        assert_eq!(req.kind, JobKind::Merge);
    }
}
