//! Account tier policy
//!
//! Per-tier ceilings on file size and batch count. Consulted once, at
//! admission; the queue and workers trust that an enqueued job already
//! satisfies its owner's limits.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountTier {
    Free,
    Premium,
}

/// Ceilings for a single tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierLimits {
    pub max_file_bytes: u64,
    pub max_batch_size: usize,
}

/// Configured limits for both tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierPolicy {
    pub free: TierLimits,
    pub premium: TierLimits,
}

impl TierPolicy {
    pub fn limits_for(&self, tier: AccountTier) -> TierLimits {
        match tier {
            AccountTier::Free => self.free,
            AccountTier::Premium => self.premium,
        }
    }
}

impl Default for TierPolicy {
    fn default() -> Self {
        Self {
            free: TierLimits {
                max_file_bytes: 50 * 1024 * 1024,
                max_batch_size: 5,
            },
            premium: TierLimits {
                max_file_bytes: 500 * 1024 * 1024,
                max_batch_size: 100,
            },
        }
    }
}
