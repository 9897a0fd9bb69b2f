//! Types shared by the engine phases and its callers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A number from the user's pool.
pub type Element = i64;

/// An increasing sequence of `k` pool elements.
pub type Ticket = Vec<Element>;

/// Input of a solve: the pool and the ticket/guarantee sizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveRequest {
    /// Distinct pool elements. Sorted by the engine before use.
    pub pool: Vec<Element>,
    /// Ticket size.
    pub k: usize,
    /// Guarantee size.
    pub m: usize,
}

impl SolveRequest {
    pub fn new(pool: Vec<Element>, k: usize, m: usize) -> Self {
        Self { pool, k, m }
    }
}

/// Summary of a finished run, consumed by result displays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveStats {
    /// `C(n, m)`.
    pub universe_size: u64,
    /// `C(n, k)`.
    pub candidate_pool_size: u64,
    /// Tickets chosen by the greedy selector.
    pub greedy_tickets: usize,
    /// Tickets forced by the residual closer.
    pub forced_tickets: usize,
    pub ticket_count: usize,
    pub covered: u64,
    pub uncovered: u64,
    pub coverage_percent: f64,
    /// `(1 - tickets / candidate pool) * 100`.
    pub reduction_percent: f64,
    /// Every `m`-subset of the pool is inside at least one ticket.
    pub fully_certified: bool,
    pub iterations: usize,
    pub elapsed_ms: u64,
}

/// Tickets in selection order plus run statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub tickets: Vec<Ticket>,
    pub stats: SolveStats,
}

/// A validated request with its size estimates.
///
/// Produced by [`Engine::plan`](super::Engine::plan) before any heavy work,
/// so callers can reject or route a request cheaply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    /// Sorted, distinct pool.
    pub pool: Vec<Element>,
    pub k: usize,
    pub m: usize,
    pub universe_size: u64,
    pub candidate_count: u64,
    /// `C(k, m)`: universe entries covered by one candidate.
    pub coverage_per_candidate: u64,
    /// Total coverage index entries, `candidate_count * coverage_per_candidate`.
    pub index_entries: u64,
    /// Lower-bound ticket estimate, `ceil(C(n, m) / C(k, m))`.
    pub estimated_tickets: u64,
}

impl Plan {
    pub fn n(&self) -> usize {
        self.pool.len()
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Input too large: {resource} exceeds the limit of {limit}; choose fewer numbers or a smaller ticket size")]
    TooLarge { resource: &'static str, limit: u64 },

    #[error("Internal error: no candidate covers residual subset {subset:?}")]
    InfeasibleResidual { subset: Vec<Element> },

    #[error("Run cancelled")]
    Cancelled,

    #[error("Worker task failed: {0}")]
    Join(String),
}

impl EngineError {
    /// Short label used for metrics and API error codes.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::InvalidInput(_) => "invalid_input",
            EngineError::TooLarge { .. } => "too_large",
            EngineError::InfeasibleResidual { .. } => "infeasible_residual",
            EngineError::Cancelled => "cancelled",
            EngineError::Join(_) => "join",
        }
    }
}
