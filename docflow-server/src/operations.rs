//! Built-in operations
//!
//! Byte-level stand-ins wired up for every job kind so the server runs end
//! to end out of the box. They treat inputs as opaque file handles: merge
//! concatenates, split emits one part per input, everything else produces a
//! labelled copy per input. A real transform backend replaces any of these
//! by registering its own `Operation` for the kind.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use docflow_core::domain::job::{JobKind, JobSettings};
use docflow_engine::{Operation, OperationRegistry, ProgressSender};
use uuid::Uuid;

/// Registers a work function for every `JobKind`
pub fn register_builtin(registry: &mut OperationRegistry, output_dir: &str) {
    let output_dir = PathBuf::from(output_dir);

    registry.register(
        JobKind::Merge,
        Arc::new(MergeOperation {
            output_dir: output_dir.clone(),
        }),
    );
    registry.register(
        JobKind::Split,
        Arc::new(SplitOperation {
            output_dir: output_dir.clone(),
        }),
    );

    for kind in JobKind::ALL {
        if matches!(kind, JobKind::Merge | JobKind::Split) {
            continue;
        }
        registry.register(
            kind,
            Arc::new(TransformOperation {
                output_dir: output_dir.clone(),
                label: kind.to_string(),
            }),
        );
    }
}

/// Concatenates all inputs into a single output file
struct MergeOperation {
    output_dir: PathBuf,
}

#[async_trait]
impl Operation for MergeOperation {
    async fn run(
        &self,
        input_files: &[String],
        _settings: &JobSettings,
        progress: ProgressSender,
    ) -> anyhow::Result<Vec<String>> {
        let total = input_files.len() as u32;
        let (_, ext) = stem_and_ext(&input_files[0]);
        let output = unique_output_path(&self.output_dir, "merged_document", &ext);

        let mut merged = Vec::new();
        for (index, path) in input_files.iter().enumerate() {
            let bytes = tokio::fs::read(path)
                .await
                .with_context(|| format!("reading input file {}", path))?;
            merged.extend_from_slice(&bytes);
            progress.report(index as u32 + 1, total);
        }

        tokio::fs::write(&output, merged)
            .await
            .with_context(|| format!("writing merged output {}", output.display()))?;

        Ok(vec![output.to_string_lossy().into_owned()])
    }
}

/// Emits one part file per input
struct SplitOperation {
    output_dir: PathBuf,
}

#[async_trait]
impl Operation for SplitOperation {
    async fn run(
        &self,
        input_files: &[String],
        _settings: &JobSettings,
        progress: ProgressSender,
    ) -> anyhow::Result<Vec<String>> {
        let total = input_files.len() as u32;
        let mut outputs = Vec::with_capacity(input_files.len());

        for (index, path) in input_files.iter().enumerate() {
            let (stem, ext) = stem_and_ext(path);
            let output = unique_output_path(
                &self.output_dir,
                &format!("{}_part{}", stem, index + 1),
                &ext,
            );
            let bytes = tokio::fs::read(path)
                .await
                .with_context(|| format!("reading input file {}", path))?;
            tokio::fs::write(&output, bytes)
                .await
                .with_context(|| format!("writing part {}", output.display()))?;
            outputs.push(output.to_string_lossy().into_owned());
            progress.report(index as u32 + 1, total);
        }

        Ok(outputs)
    }
}

/// Produces a labelled copy of each input
struct TransformOperation {
    output_dir: PathBuf,
    label: String,
}

#[async_trait]
impl Operation for TransformOperation {
    async fn run(
        &self,
        input_files: &[String],
        _settings: &JobSettings,
        progress: ProgressSender,
    ) -> anyhow::Result<Vec<String>> {
        let total = input_files.len() as u32;
        let mut outputs = Vec::with_capacity(input_files.len());

        for (index, path) in input_files.iter().enumerate() {
            let (stem, ext) = stem_and_ext(path);
            let output = unique_output_path(
                &self.output_dir,
                &format!("{}_{}", stem, self.label),
                &ext,
            );
            let bytes = tokio::fs::read(path)
                .await
                .with_context(|| format!("reading input file {}", path))?;
            tokio::fs::write(&output, bytes)
                .await
                .with_context(|| format!("writing output {}", output.display()))?;
            outputs.push(output.to_string_lossy().into_owned());
            progress.report(index as u32 + 1, total);
        }

        Ok(outputs)
    }
}

/// Unique output filename preserving the extension
fn unique_output_path(dir: &Path, stem: &str, ext: &str) -> PathBuf {
    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let unique = Uuid::new_v4().to_string();
    dir.join(format!("{}_{}_{}{}", stem, timestamp, &unique[..8], ext))
}

fn stem_and_ext(path: &str) -> (String, String) {
    let path = Path::new(path);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string();
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_else(|| ".pdf".to_string());
    (stem, ext)
}
