//! Engine limits and checkpoint intervals.

use serde::{Deserialize, Serialize};

/// Configuration for the covering engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum candidate pool size `C(n, k)`.
    #[serde(default = "default_max_candidates")]
    pub max_candidates: u64,

    /// Maximum universe size `C(n, m)`.
    #[serde(default = "default_max_universe")]
    pub max_universe: u64,

    /// Maximum coverage index entries `C(n, k) * C(k, m)` (4 bytes each).
    #[serde(default = "default_max_index_entries")]
    pub max_index_entries: u64,

    /// Greedy iterations between active pool prunes.
    #[serde(default = "default_prune_interval")]
    pub prune_interval: usize,

    /// Candidates indexed between cancellation checks.
    #[serde(default = "default_index_checkpoint_interval")]
    pub index_checkpoint_interval: usize,

    /// Greedy iterations between cancellation checks.
    #[serde(default = "default_greedy_checkpoint_interval")]
    pub greedy_checkpoint_interval: usize,
}

fn default_max_candidates() -> u64 {
    5_000_000
}

fn default_max_universe() -> u64 {
    50_000_000
}

fn default_max_index_entries() -> u64 {
    50_000_000
}

fn default_prune_interval() -> usize {
    10
}

fn default_index_checkpoint_interval() -> usize {
    100
}

fn default_greedy_checkpoint_interval() -> usize {
    50
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_candidates: default_max_candidates(),
            max_universe: default_max_universe(),
            max_index_entries: default_max_index_entries(),
            prune_interval: default_prune_interval(),
            index_checkpoint_interval: default_index_checkpoint_interval(),
            greedy_checkpoint_interval: default_greedy_checkpoint_interval(),
        }
    }
}
