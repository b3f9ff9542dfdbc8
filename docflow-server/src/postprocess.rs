//! Free-tier output stamp
//!
//! Post-processing hook the worker pool applies to free-tier outputs after
//! the operation returns and before the job completes: a marker trailer is
//! appended to each output file in place. Premium jobs never reach it.

use anyhow::Context;
use async_trait::async_trait;
use docflow_core::domain::job::Job;
use docflow_engine::PostProcess;
use tokio::io::AsyncWriteExt;

const DEFAULT_MARKER: &str = "\n%% Processed with DocFlow Free - upgrade to remove this notice\n";

pub struct FreeTierStamp {
    marker: String,
}

impl FreeTierStamp {
    pub fn new() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
        }
    }
}

impl Default for FreeTierStamp {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PostProcess for FreeTierStamp {
    async fn apply(&self, job: &Job, output_files: &[String]) -> anyhow::Result<()> {
        for path in output_files {
            let mut file = tokio::fs::OpenOptions::new()
                .append(true)
                .open(path)
                .await
                .with_context(|| format!("opening output {} for job {}", path, job.id))?;
            file.write_all(self.marker.as_bytes())
                .await
                .with_context(|| format!("stamping output {}", path))?;
        }
        Ok(())
    }
}
