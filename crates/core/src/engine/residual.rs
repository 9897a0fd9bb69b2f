//! Forced coverage of subsets the greedy phase left behind.

use tracing::{error, info};

use super::context::RunContext;
use super::EngineError;

const RESIDUAL_PROGRESS: f64 = 0.90;
const RESIDUAL_CHECKPOINT_INTERVAL: usize = 10;

/// Cover every subset still in `remaining` by appending, for each one, the
/// first candidate of the full pool that contains it.
///
/// Returns the number of forced tickets.
pub(crate) fn close(ctx: &mut RunContext<'_>) -> Result<usize, EngineError> {
    if ctx.remaining.is_empty() {
        return Ok(0);
    }

    info!(residual = ctx.remaining.len(), "Forcing coverage of residual subsets");
    ctx.monitor.report(RESIDUAL_PROGRESS);

    let snapshot: Vec<usize> = ctx.remaining.iter().collect();
    let mut forced = 0;

    for (i, rank) in snapshot.into_iter().enumerate() {
        if !ctx.remaining.contains(rank) {
            continue;
        }

        let target = ctx.universe.unrank(rank);
        let Some(candidate) = ctx.candidates.iter().position(|c| c.is_superset_of(target)) else {
            let subset = ctx.elements(target);
            error!(?subset, "No candidate covers residual subset");
            return Err(EngineError::InfeasibleResidual { subset });
        };

        ctx.select(candidate);
        forced += 1;

        if i % RESIDUAL_CHECKPOINT_INTERVAL == 0 {
            ctx.monitor.check()?;
        }
    }

    info!(forced, "Residual phase complete");
    Ok(forced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::progress::RunMonitor;
    use crate::engine::{CancellationToken, Engine, EngineConfig, SolveRequest};

    fn context<'a>(pool: Vec<i64>, k: usize, m: usize, config: &'a EngineConfig) -> RunContext<'a> {
        let plan = Engine::new(config.clone())
            .plan(&SolveRequest::new(pool, k, m))
            .unwrap();
        RunContext::prepare(plan, config, RunMonitor::new(None, CancellationToken::new())).unwrap()
    }

    #[test]
    fn test_nothing_to_close() {
        let config = EngineConfig::default();
        let mut ctx = context(vec![1, 2, 3], 3, 2, &config);
        ctx.select(0);
        assert_eq!(close(&mut ctx).unwrap(), 0);
        assert_eq!(ctx.solution, vec![0]);
    }

    #[test]
    fn test_closes_everything_from_scratch() {
        let config = EngineConfig::default();
        let mut ctx = context((1..=6).collect(), 3, 2, &config);
        let forced = close(&mut ctx).unwrap();
        assert!(ctx.remaining.is_empty());
        assert_eq!(forced, ctx.solution.len());
        // First uncovered pair is {1,2}; first candidate holding it is {1,2,3}.
        assert_eq!(ctx.solution[0], 0);
    }

    #[test]
    fn test_skips_subsets_covered_within_the_phase() {
        let config = EngineConfig::default();
        let mut ctx = context(vec![1, 2, 3, 4], 3, 2, &config);
        let forced = close(&mut ctx).unwrap();
        // {1,2,3} covers three pairs, {1,2,4} adds two and {1,3,4} the last one.
        assert_eq!(forced, 3);
        assert_eq!(
            ctx.tickets(),
            vec![vec![1, 2, 3], vec![1, 2, 4], vec![1, 3, 4]]
        );
    }

    #[test]
    fn test_missing_candidate_is_internal_error() {
        let config = EngineConfig::default();
        let mut ctx = context(vec![1, 2, 3, 4], 3, 2, &config);
        ctx.candidates.truncate(1);
        let err = close(&mut ctx).unwrap_err();
        match err {
            EngineError::InfeasibleResidual { subset } => assert_eq!(subset, vec![1, 4]),
            other => panic!("unexpected error: {other}"),
        }
    }
}
