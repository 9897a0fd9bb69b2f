//! Per-run state shared by the engine phases.

use super::bitset::CoverSet;
use super::config::EngineConfig;
use super::coverage::{CoverageIndex, Universe};
use super::progress::RunMonitor;
use super::subset::{IndexCombinations, Subset};
use super::{EngineError, Element, Plan, Ticket};

/// Everything one run owns. Built at the start of a run and dropped at its end.
pub(crate) struct RunContext<'a> {
    pub(crate) pool: Vec<Element>,
    pub(crate) universe: Universe,
    /// All `k`-subsets in lexicographic order.
    pub(crate) candidates: Vec<Subset>,
    pub(crate) index: CoverageIndex,
    /// Universe ranks not yet covered by `solution`.
    pub(crate) remaining: CoverSet,
    /// Selected candidate indices, in selection order.
    pub(crate) solution: Vec<usize>,
    pub(crate) iterations: usize,
    pub(crate) monitor: RunMonitor,
    pub(crate) config: &'a EngineConfig,
}

impl<'a> RunContext<'a> {
    /// Generate the universe and candidate pool and build the coverage index.
    pub(crate) fn prepare(
        plan: Plan,
        config: &'a EngineConfig,
        mut monitor: RunMonitor,
    ) -> Result<Self, EngineError> {
        let n = plan.n();

        let universe = Universe::new(n, plan.m);
        monitor.report(0.05);

        let mut candidates = Vec::with_capacity(plan.candidate_count as usize);
        let mut combos = IndexCombinations::new(n, plan.k);
        while let Some(positions) = combos.next_positions() {
            candidates.push(Subset::from_positions(positions));
        }
        monitor.report(0.10);
        monitor.check()?;

        monitor.report(0.15);
        let index = CoverageIndex::build(
            &candidates,
            plan.k,
            &universe,
            &mut monitor,
            config.index_checkpoint_interval,
        )?;

        let remaining = CoverSet::full(universe.size());

        Ok(Self {
            pool: plan.pool,
            universe,
            candidates,
            index,
            remaining,
            solution: Vec::new(),
            iterations: 0,
            monitor,
            config,
        })
    }

    /// Add `candidate` to the solution and drop everything it covers from `remaining`.
    pub(crate) fn select(&mut self, candidate: usize) -> usize {
        self.solution.push(candidate);
        self.remaining.remove_all(self.index.coverage(candidate))
    }

    pub(crate) fn covered(&self) -> usize {
        self.universe.size() - self.remaining.len()
    }

    /// Pool elements of `subset`, ascending.
    pub(crate) fn elements(&self, subset: Subset) -> Ticket {
        subset.positions().map(|p| self.pool[p]).collect()
    }

    pub(crate) fn tickets(&self) -> Vec<Ticket> {
        self.solution
            .iter()
            .map(|&candidate| self.elements(self.candidates[candidate]))
            .collect()
    }
}
