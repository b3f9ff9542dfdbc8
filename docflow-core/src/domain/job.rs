//! Job domain types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::tier::AccountTier;

pub type JobId = Uuid;

/// Opaque per-kind configuration bag (compression quality, rotation
/// degrees, passwords, page lists, ...). Interpreted only by operations.
pub type JobSettings = std::collections::HashMap<String, serde_json::Value>;

/// Document-processing job record
///
/// Structure shared between the admission layer (persists) and the worker
/// pool (updates). `id`, `owner`, `tier`, `kind`, `input_files` and
/// `settings` are fixed at creation; everything else is written by the
/// single worker that claims the job, or by the cancellation path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub owner: String,
    pub tier: AccountTier,
    pub kind: JobKind,
    pub status: JobStatus,
    pub input_files: Vec<String>,
    pub output_files: Vec<String>,
    pub settings: JobSettings,
    /// 0-100, non-decreasing while Processing. 100 only on Completed.
    pub progress: u8,
    pub total_units: u32,
    pub completed_units: u32,
    pub error_detail: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Job {
    /// Creates a new Pending job record
    pub fn new(
        owner: impl Into<String>,
        tier: AccountTier,
        kind: JobKind,
        input_files: Vec<String>,
        settings: JobSettings,
    ) -> Self {
        let total_units = input_files.len() as u32;
        Self {
            id: Uuid::new_v4(),
            owner: owner.into(),
            tier,
            kind,
            status: JobStatus::Pending,
            input_files,
            output_files: Vec::new(),
            settings,
            progress: 0,
            total_units,
            completed_units: 0,
            error_detail: None,
            created_at: chrono::Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }
}

/// Job lifecycle status
///
/// Pending -> Processing -> {Completed | Failed}, and
/// Pending | Processing -> Cancelled. Terminal states are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Whether the state machine permits `self -> next`
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        use JobStatus::*;
        matches!(
            (self, next),
            (Pending, Processing)
                | (Processing, Completed)
                | (Processing, Failed)
                | (Pending, Cancelled)
                | (Processing, Cancelled)
        )
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Operation type, closed set
///
/// The dispatcher never matches on this directly; each kind maps to a work
/// function through the operation registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    Merge,
    Split,
    Compress,
    Ocr,
    ConvertToWord,
    ConvertToExcel,
    ConvertToPdf,
    ConvertFromPdf,
    Rotate,
    Watermark,
    Protect,
    Unlock,
    OrganizePages,
    ExtractImages,
    Repair,
    Sign,
    Redact,
    Compare,
    AddPageNumbers,
    Crop,
    Edit,
}

impl JobKind {
    /// All kinds, in a stable order (used to register built-in operations)
    pub const ALL: [JobKind; 21] = [
        JobKind::Merge,
        JobKind::Split,
        JobKind::Compress,
        JobKind::Ocr,
        JobKind::ConvertToWord,
        JobKind::ConvertToExcel,
        JobKind::ConvertToPdf,
        JobKind::ConvertFromPdf,
        JobKind::Rotate,
        JobKind::Watermark,
        JobKind::Protect,
        JobKind::Unlock,
        JobKind::OrganizePages,
        JobKind::ExtractImages,
        JobKind::Repair,
        JobKind::Sign,
        JobKind::Redact,
        JobKind::Compare,
        JobKind::AddPageNumbers,
        JobKind::Crop,
        JobKind::Edit,
    ];
}

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // snake_case, matching the serde representation
        let s = match self {
            Self::Merge => "merge",
            Self::Split => "split",
            Self::Compress => "compress",
            Self::Ocr => "ocr",
            Self::ConvertToWord => "convert_to_word",
            Self::ConvertToExcel => "convert_to_excel",
            Self::ConvertToPdf => "convert_to_pdf",
            Self::ConvertFromPdf => "convert_from_pdf",
            Self::Rotate => "rotate",
            Self::Watermark => "watermark",
            Self::Protect => "protect",
            Self::Unlock => "unlock",
            Self::OrganizePages => "organize_pages",
            Self::ExtractImages => "extract_images",
            Self::Repair => "repair",
            Self::Sign => "sign",
            Self::Redact => "redact",
            Self::Compare => "compare",
            Self::AddPageNumbers => "add_page_numbers",
            Self::Crop => "crop",
            Self::Edit => "edit",
        };
        f.write_str(s)
    }
}
