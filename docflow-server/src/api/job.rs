//! Job API Handlers
//!
//! HTTP endpoints for job admission and lifecycle. Tier limits are enforced
//! here, once, before a record is created; the engine trusts admitted jobs.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use docflow_core::domain::job::Job;
use docflow_core::domain::tier::TierPolicy;
use docflow_core::dto::job::{CreateJobRequest, JobSnapshot};
use uuid::Uuid;

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};

/// POST /job/create
/// Validate admission limits, persist a pending job and enqueue it
pub async fn create_job(
    State(state): State<AppState>,
    Json(req): Json<CreateJobRequest>,
) -> ApiResult<Json<JobSnapshot>> {
    tracing::info!(
        "Creating {} job for owner {} ({} input files)",
        req.kind,
        req.owner,
        req.input_files.len()
    );

    validate_admission(&state.tier_policy, &req).await?;

    let job = Job::new(req.owner, req.tier, req.kind, req.input_files, req.settings);
    let snapshot: JobSnapshot = job.clone().into();

    state.store.create(job).await?;
    state.manager.submit(snapshot.id).await?;

    Ok(Json(snapshot))
}

/// GET /job/{id}
/// Read-only status/progress snapshot
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<JobSnapshot>> {
    tracing::debug!("Getting job: {}", id);

    let snapshot = state.manager.status_of(id).await?;
    Ok(Json(snapshot))
}

/// POST /job/{id}/cancel
/// Cancel a pending or processing job
pub async fn cancel_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    tracing::info!("Cancelling job: {}", id);

    state.manager.cancel(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /job/{id}
/// Administrative record cleanup
pub async fn delete_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    tracing::info!("Deleting job: {}", id);

    if state.store.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Job {} not found", id)))
    }
}

/// GET /job/owner/{owner}
/// Recent jobs for an owner, most recent first
pub async fn list_jobs_by_owner(
    State(state): State<AppState>,
    Path(owner): Path<String>,
) -> ApiResult<Json<Vec<JobSnapshot>>> {
    tracing::debug!("Listing jobs for owner: {}", owner);

    let jobs = state.store.list_for_owner(&owner).await?;
    Ok(Json(jobs.into_iter().map(JobSnapshot::from).collect()))
}

/// Admission checks: batch count and per-file size against the owner's
/// tier, and existence of every referenced input file.
async fn validate_admission(policy: &TierPolicy, req: &CreateJobRequest) -> Result<(), ApiError> {
    if req.input_files.is_empty() {
        return Err(ApiError::BadRequest("No input files provided".to_string()));
    }

    let limits = policy.limits_for(req.tier);

    if req.input_files.len() > limits.max_batch_size {
        return Err(ApiError::BadRequest(format!(
            "Batch of {} files exceeds the {} file limit for this tier",
            req.input_files.len(),
            limits.max_batch_size
        )));
    }

    for path in &req.input_files {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|_| ApiError::BadRequest(format!("Input file {} not found", path)))?;

        if metadata.len() > limits.max_file_bytes {
            return Err(ApiError::BadRequest(format!(
                "File {} exceeds the {} byte limit for this tier",
                path, limits.max_file_bytes
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use docflow_core::domain::job::{JobKind, JobSettings};
    use docflow_core::domain::tier::{AccountTier, TierLimits};

    fn request(tier: AccountTier, input_files: Vec<String>) -> CreateJobRequest {
        CreateJobRequest {
            owner: "user-1".to_string(),
            tier,
            kind: JobKind::Merge,
            input_files,
            settings: JobSettings::new(),
        }
    }

    fn strict_policy() -> TierPolicy {
        TierPolicy {
            free: TierLimits {
                max_file_bytes: 16,
                max_batch_size: 2,
            },
            premium: TierLimits {
                max_file_bytes: 1024,
                max_batch_size: 10,
            },
        }
    }

    fn temp_file(content: &[u8]) -> String {
        let path = std::env::temp_dir().join(format!("docflow-admit-{}", Uuid::new_v4()));
        std::fs::write(&path, content).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[tokio::test]
    async fn test_empty_batch_rejected() {
        let err = validate_admission(&strict_policy(), &request(AccountTier::Free, vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_batch_over_tier_limit_rejected() {
        let files = vec![temp_file(b"a"), temp_file(b"b"), temp_file(b"c")];
        let err = validate_admission(&strict_policy(), &request(AccountTier::Free, files))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_oversized_file_rejected_for_free_tier_only() {
        let big = temp_file(&[0u8; 64]);

        let err = validate_admission(&strict_policy(), &request(AccountTier::Free, vec![big.clone()]))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));

        // The same file passes under premium ceilings
        validate_admission(&strict_policy(), &request(AccountTier::Premium, vec![big]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_missing_file_rejected() {
        let files = vec!["/nonexistent/input.pdf".to_string()];
        let err = validate_admission(&strict_policy(), &request(AccountTier::Premium, files))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_valid_batch_admitted() {
        let files = vec![temp_file(b"small"), temp_file(b"files")];
        validate_admission(&strict_policy(), &request(AccountTier::Free, files))
            .await
            .unwrap();
    }
}
