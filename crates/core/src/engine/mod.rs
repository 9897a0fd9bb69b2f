//! Greedy covering engine.
//!
//! Given a pool of `n` numbers, a ticket size `k` and a guarantee size `m`,
//! the engine selects `k`-subsets ("tickets") until every `m`-subset of the
//! pool is contained in at least one of them:
//! - **Index**: every candidate ticket is mapped to the `m`-subsets it holds
//! - **Greedy**: the candidate with the largest uncovered gain is taken, ties
//!   going to the first candidate in lexicographic order
//! - **Residual**: anything greedy leaves behind is forced in with the first
//!   candidate that holds it
//!
//! The result is deterministic for a given input.

mod audit;
mod bitset;
mod config;
mod context;
mod coverage;
mod greedy;
mod progress;
mod residual;
mod subset;
mod types;

pub use audit::{audit_cover, CoverageReport};
pub use bitset::CoverSet;
pub use config::EngineConfig;
pub use coverage::{CoverageIndex, Universe};
pub use progress::{CancellationToken, ProgressCallback};
pub use subset::{binomial, BinomialTable, Combinations, IndexCombinations, Subset, MAX_POOL_SIZE};
pub use types::{Element, EngineError, Plan, Solution, SolveRequest, SolveStats, Ticket};

use std::time::Instant;

use tracing::{info, warn};

use crate::metrics::{SOLVE_DURATION, SOLVE_RUNS, TICKETS_GENERATED};
use context::RunContext;
use progress::RunMonitor;

/// Runs covering solves under a fixed set of limits.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validate a request and estimate its size without doing any heavy work.
    pub fn plan(&self, request: &SolveRequest) -> Result<Plan, EngineError> {
        let SolveRequest { pool, k, m } = request;
        let (k, m) = (*k, *m);

        let mut pool = pool.clone();
        pool.sort_unstable();
        if let Some(pair) = pool.windows(2).find(|w| w[0] == w[1]) {
            return Err(EngineError::InvalidInput(format!(
                "number {} appears more than once",
                pair[0]
            )));
        }
        let n = pool.len();

        if m == 0 {
            return Err(EngineError::InvalidInput(
                "guarantee size must be at least 1".to_string(),
            ));
        }
        if n < k {
            return Err(EngineError::InvalidInput(format!(
                "not enough numbers: {n} < {k}"
            )));
        }
        if m > k {
            return Err(EngineError::InvalidInput(format!(
                "guarantee impossible: m={m} > k={k}"
            )));
        }
        if n > MAX_POOL_SIZE {
            return Err(EngineError::TooLarge {
                resource: "pool size",
                limit: MAX_POOL_SIZE as u64,
            });
        }

        let candidate_count = binomial(n as u64, k as u64)
            .filter(|&count| count <= self.config.max_candidates)
            .ok_or(EngineError::TooLarge {
                resource: "candidate pool",
                limit: self.config.max_candidates,
            })?;

        let universe_limit = self.config.max_universe.min(u64::from(u32::MAX));
        let universe_size = binomial(n as u64, m as u64)
            .filter(|&size| size <= universe_limit)
            .ok_or(EngineError::TooLarge {
                resource: "universe",
                limit: universe_limit,
            })?;

        let coverage_per_candidate = binomial(k as u64, m as u64).unwrap_or(u64::MAX);
        let index_entries = candidate_count
            .checked_mul(coverage_per_candidate)
            .filter(|&entries| entries <= self.config.max_index_entries)
            .ok_or(EngineError::TooLarge {
                resource: "coverage index",
                limit: self.config.max_index_entries,
            })?;

        Ok(Plan {
            pool,
            k,
            m,
            universe_size,
            candidate_count,
            coverage_per_candidate,
            index_entries,
            estimated_tickets: universe_size.div_ceil(coverage_per_candidate),
        })
    }

    /// Validate and solve on the current thread.
    pub fn run(
        &self,
        request: &SolveRequest,
        progress: Option<ProgressCallback>,
        cancel: &CancellationToken,
    ) -> Result<Solution, EngineError> {
        let plan = match self.plan(request) {
            Ok(plan) => plan,
            Err(e) => {
                SOLVE_RUNS.with_label_values(&[e.kind()]).inc();
                return Err(e);
            }
        };
        self.execute(plan, progress, cancel)
    }

    /// Solve an already validated plan on the current thread.
    pub fn execute(
        &self,
        plan: Plan,
        progress: Option<ProgressCallback>,
        cancel: &CancellationToken,
    ) -> Result<Solution, EngineError> {
        let start = Instant::now();
        info!(
            n = plan.n(),
            k = plan.k,
            m = plan.m,
            universe = plan.universe_size,
            candidates = plan.candidate_count,
            "Starting covering run"
        );

        let result = self.execute_phases(plan, progress, cancel, start);
        SOLVE_DURATION.observe(start.elapsed().as_secs_f64());

        match &result {
            Ok(solution) => {
                SOLVE_RUNS.with_label_values(&["ok"]).inc();
                TICKETS_GENERATED.observe(solution.stats.ticket_count as f64);
                info!(
                    tickets = solution.stats.ticket_count,
                    greedy = solution.stats.greedy_tickets,
                    forced = solution.stats.forced_tickets,
                    coverage = solution.stats.coverage_percent,
                    reduction = solution.stats.reduction_percent,
                    elapsed_ms = solution.stats.elapsed_ms,
                    "Covering run complete"
                );
                if !solution.stats.fully_certified {
                    warn!(
                        uncovered = solution.stats.uncovered,
                        "Run finished without full coverage"
                    );
                }
            }
            Err(e) => {
                SOLVE_RUNS.with_label_values(&[e.kind()]).inc();
                warn!(error = %e, "Covering run failed");
            }
        }
        result
    }

    fn execute_phases(
        &self,
        plan: Plan,
        progress: Option<ProgressCallback>,
        cancel: &CancellationToken,
        start: Instant,
    ) -> Result<Solution, EngineError> {
        let monitor = RunMonitor::new(progress, cancel.clone());
        let mut ctx = RunContext::prepare(plan, &self.config, monitor)?;

        let greedy_tickets = greedy::select_all(&mut ctx)?;
        let forced_tickets = residual::close(&mut ctx)?;

        let universe_size = ctx.universe.size() as u64;
        let candidate_pool_size = ctx.candidates.len() as u64;
        let ticket_count = ctx.solution.len();
        let covered = ctx.covered() as u64;

        let stats = SolveStats {
            universe_size,
            candidate_pool_size,
            greedy_tickets,
            forced_tickets,
            ticket_count,
            covered,
            uncovered: universe_size - covered,
            coverage_percent: covered as f64 / universe_size as f64 * 100.0,
            reduction_percent: (1.0 - ticket_count as f64 / candidate_pool_size as f64) * 100.0,
            fully_certified: ctx.remaining.is_empty(),
            iterations: ctx.iterations,
            elapsed_ms: start.elapsed().as_millis() as u64,
        };
        let tickets = ctx.tickets();

        ctx.monitor.finish();
        Ok(Solution { tickets, stats })
    }

    /// Validate synchronously, then solve on the blocking thread pool.
    ///
    /// Invalid or oversized requests fail before any work is spawned.
    pub async fn solve(
        &self,
        request: SolveRequest,
        progress: Option<ProgressCallback>,
        cancel: CancellationToken,
    ) -> Result<Solution, EngineError> {
        let plan = match self.plan(&request) {
            Ok(plan) => plan,
            Err(e) => {
                SOLVE_RUNS.with_label_values(&[e.kind()]).inc();
                return Err(e);
            }
        };
        self.solve_plan(plan, progress, cancel).await
    }

    /// Solve a validated plan on the blocking thread pool.
    pub async fn solve_plan(
        &self,
        plan: Plan,
        progress: Option<ProgressCallback>,
        cancel: CancellationToken,
    ) -> Result<Solution, EngineError> {
        let engine = self.clone();
        tokio::task::spawn_blocking(move || engine.execute(plan, progress, &cancel))
            .await
            .map_err(|e| EngineError::Join(e.to_string()))?
    }
}
