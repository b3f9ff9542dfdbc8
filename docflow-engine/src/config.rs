//! Engine configuration

/// Worker pool configuration
///
/// The pool is deliberately small by default; document transforms are CPU
/// and memory heavy, and admission-time tier limits are the only other
/// throttle in the system.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Number of concurrent worker tasks
    pub worker_count: usize,
}

impl EngineConfig {
    pub fn new(worker_count: usize) -> Self {
        Self { worker_count }
    }

    /// Creates configuration from environment variables
    ///
    /// - DOCFLOW_WORKER_COUNT (optional, default: 2)
    pub fn from_env() -> Self {
        let worker_count = std::env::var("DOCFLOW_WORKER_COUNT")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(2);

        Self { worker_count }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.worker_count == 0 {
            anyhow::bail!("worker_count must be greater than 0");
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { worker_count: 2 }
    }
}
