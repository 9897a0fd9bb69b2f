//! Greedy maximum-gain selection.

use tracing::{debug, info, warn};

use super::context::RunContext;
use super::EngineError;

const GREEDY_PROGRESS_START: f64 = 0.45;
const GREEDY_PROGRESS_SPAN: f64 = 0.45;

/// Candidates still worth scanning, in generation order.
pub(crate) struct ActivePool {
    candidates: Vec<usize>,
}

impl ActivePool {
    pub(crate) fn all(count: usize) -> Self {
        Self {
            candidates: (0..count).collect(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.candidates.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Drop candidates that no longer cover anything in `remaining`.
    fn prune(&mut self, ctx: &RunContext<'_>) {
        self.candidates
            .retain(|&c| ctx.remaining.intersects(ctx.index.coverage(c)));
    }
}

/// One greedy iteration: select the active candidate with the largest gain.
///
/// Ties go to the first candidate in scan order. Returns the selected
/// candidate, or `None` when nothing in the pool covers a remaining subset.
pub(crate) fn step(ctx: &mut RunContext<'_>, active: &mut ActivePool) -> Option<usize> {
    let target = ctx.remaining.len();
    let mut best: Option<usize> = None;
    let mut best_gain = 0;

    for &candidate in &active.candidates {
        let gain = ctx.remaining.count_present(ctx.index.coverage(candidate));
        if gain > best_gain {
            best_gain = gain;
            best = Some(candidate);
        }
        if gain == target {
            break;
        }
    }

    let chosen = best?;
    ctx.iterations += 1;
    let removed = ctx.select(chosen);
    debug_assert_eq!(removed, best_gain);

    if ctx.iterations % ctx.config.prune_interval.max(1) == 0 {
        active.prune(ctx);
    }
    Some(chosen)
}

/// Run greedy iterations until everything is covered or no gain is left.
pub(crate) fn select_all(ctx: &mut RunContext<'_>) -> Result<usize, EngineError> {
    let universe_size = ctx.universe.size();
    let checkpoint_interval = ctx.config.greedy_checkpoint_interval.max(1);
    let mut active = ActivePool::all(ctx.candidates.len());
    ctx.monitor.report(GREEDY_PROGRESS_START);

    while !ctx.remaining.is_empty() && !active.is_empty() {
        if step(ctx, &mut active).is_none() {
            warn!(
                residual = ctx.remaining.len(),
                "Greedy selection stopped with uncovered subsets"
            );
            break;
        }

        let covered = ctx.covered();
        ctx.monitor.report(
            GREEDY_PROGRESS_START + covered as f64 / universe_size as f64 * GREEDY_PROGRESS_SPAN,
        );

        if ctx.iterations % checkpoint_interval == 0 {
            ctx.monitor.check()?;
        }
        if ctx.iterations % 100 == 0 {
            debug!(
                iteration = ctx.iterations,
                tickets = ctx.solution.len(),
                covered,
                universe = universe_size,
                active = active.len(),
                "Greedy progress"
            );
        }
    }

    info!(
        tickets = ctx.solution.len(),
        residual = ctx.remaining.len(),
        "Greedy phase complete"
    );
    Ok(ctx.solution.len())
}
