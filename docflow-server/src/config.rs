//! Server configuration

use docflow_core::domain::tier::{TierLimits, TierPolicy};

/// Configuration for the DocFlow server
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP API binds to
    pub bind_addr: String,

    /// Number of concurrent worker tasks
    pub worker_count: usize,

    /// Directory holding uploaded input files
    pub upload_dir: String,

    /// Directory operations write output files to
    pub processed_dir: String,

    /// Per-tier admission ceilings
    pub tier_policy: TierPolicy,
}

impl Config {
    /// Creates configuration from environment variables
    ///
    /// Expected environment variables (all optional):
    /// - DOCFLOW_BIND_ADDR (default: 0.0.0.0:8080)
    /// - DOCFLOW_WORKER_COUNT (default: 2)
    /// - DOCFLOW_UPLOAD_DIR (default: uploads)
    /// - DOCFLOW_PROCESSED_DIR (default: processed)
    /// - DOCFLOW_FREE_MAX_FILE_BYTES / DOCFLOW_FREE_MAX_BATCH
    /// - DOCFLOW_PREMIUM_MAX_FILE_BYTES / DOCFLOW_PREMIUM_MAX_BATCH
    pub fn from_env() -> Self {
        let defaults = TierPolicy::default();

        let bind_addr =
            std::env::var("DOCFLOW_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let worker_count = std::env::var("DOCFLOW_WORKER_COUNT")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(2);

        let upload_dir =
            std::env::var("DOCFLOW_UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());

        let processed_dir =
            std::env::var("DOCFLOW_PROCESSED_DIR").unwrap_or_else(|_| "processed".to_string());

        let tier_policy = TierPolicy {
            free: TierLimits {
                max_file_bytes: env_u64("DOCFLOW_FREE_MAX_FILE_BYTES", defaults.free.max_file_bytes),
                max_batch_size: env_usize("DOCFLOW_FREE_MAX_BATCH", defaults.free.max_batch_size),
            },
            premium: TierLimits {
                max_file_bytes: env_u64(
                    "DOCFLOW_PREMIUM_MAX_FILE_BYTES",
                    defaults.premium.max_file_bytes,
                ),
                max_batch_size: env_usize(
                    "DOCFLOW_PREMIUM_MAX_BATCH",
                    defaults.premium.max_batch_size,
                ),
            },
        };

        Self {
            bind_addr,
            worker_count,
            upload_dir,
            processed_dir,
            tier_policy,
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.bind_addr.is_empty() {
            anyhow::bail!("bind_addr cannot be empty");
        }
        if self.worker_count == 0 {
            anyhow::bail!("worker_count must be greater than 0");
        }
        if self.upload_dir.is_empty() || self.processed_dir.is_empty() {
            anyhow::bail!("upload and processed directories cannot be empty");
        }
        if self.tier_policy.free.max_batch_size == 0 {
            anyhow::bail!("free tier batch limit must be greater than 0");
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            worker_count: 2,
            upload_dir: "uploads".to_string(),
            processed_dir: "processed".to_string(),
            tier_policy: TierPolicy::default(),
        }
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert_eq!(config.worker_count, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_configs_rejected() {
        let mut config = Config::default();
        config.worker_count = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.bind_addr = String::new();
        assert!(config.validate().is_err());
    }
}
