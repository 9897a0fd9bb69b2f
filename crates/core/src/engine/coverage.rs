//! Universe ranking and the candidate coverage index.

use tracing::debug;

use super::progress::RunMonitor;
use super::subset::{BinomialTable, IndexCombinations, Subset};
use super::EngineError;

/// Progress band of the index build within the whole run.
const INDEX_PROGRESS_START: f64 = 0.15;
const INDEX_PROGRESS_SPAN: f64 = 0.30;

/// The size-`m` subsets of an `n`-element pool, identified by lexicographic rank.
///
/// The universe is never materialised: rank `r` stands for the `r`-th
/// `m`-subset in the same order the subset generator would produce it.
#[derive(Debug, Clone)]
pub struct Universe {
    n: usize,
    m: usize,
    size: usize,
    table: BinomialTable,
}

impl Universe {
    /// Build the universe for `C(n, m)` subsets. Callers must have checked
    /// that `C(n, m)` fits the engine limits.
    pub fn new(n: usize, m: usize) -> Self {
        let table = BinomialTable::new(n);
        let size = table.get(n, m) as usize;
        Self { n, m, size, table }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn m(&self) -> usize {
        self.m
    }

    /// Lexicographic rank of ascending positions `c_0 < ... < c_{m-1}`.
    pub fn rank<I>(&self, positions: I) -> usize
    where
        I: IntoIterator<Item = usize>,
    {
        let mut tail = 0u64;
        for (i, c) in positions.into_iter().enumerate() {
            tail += self.table.get(self.n - 1 - c, self.m - i);
        }
        self.size - 1 - tail as usize
    }

    /// The subset with lexicographic rank `rank`.
    pub fn unrank(&self, rank: usize) -> Subset {
        debug_assert!(rank < self.size);
        let mut remaining = rank as u64;
        let mut positions = Vec::with_capacity(self.m);
        let mut x = 0usize;
        for i in 0..self.m {
            loop {
                let block = self.table.get(self.n - 1 - x, self.m - 1 - i);
                if block > remaining {
                    break;
                }
                remaining -= block;
                x += 1;
            }
            positions.push(x);
            x += 1;
        }
        Subset::from_positions(&positions)
    }
}

/// For every candidate, the universe ranks of the `m`-subsets it contains.
///
/// Stored flat with a fixed stride of `C(k, m)` ranks per candidate.
#[derive(Debug, Clone)]
pub struct CoverageIndex {
    stride: usize,
    ranks: Vec<u32>,
}

impl CoverageIndex {
    /// Build the index for `candidates` (all of size `k`).
    ///
    /// Reports progress at ~10% granularity and polls cancellation every
    /// `checkpoint_interval` candidates.
    pub(crate) fn build(
        candidates: &[Subset],
        k: usize,
        universe: &Universe,
        monitor: &mut RunMonitor,
        checkpoint_interval: usize,
    ) -> Result<Self, EngineError> {
        let m = universe.m();
        let stride = BinomialTable::new(k).get(k, m) as usize;
        let total = candidates.len();
        let report_every = (total / 10).max(1);
        let checkpoint_interval = checkpoint_interval.max(1);

        let mut ranks = Vec::with_capacity(total * stride);
        let mut members = Vec::with_capacity(k);

        for (i, candidate) in candidates.iter().enumerate() {
            members.clear();
            members.extend(candidate.positions());

            let mut combos = IndexCombinations::new(members.len(), m);
            while let Some(picked) = combos.next_positions() {
                let rank = universe.rank(picked.iter().map(|&j| members[j]));
                ranks.push(rank as u32);
            }

            if i % report_every == 0 {
                monitor.report(
                    INDEX_PROGRESS_START + i as f64 / total as f64 * INDEX_PROGRESS_SPAN,
                );
            }
            if i % checkpoint_interval == 0 {
                monitor.check()?;
            }
        }

        debug!(candidates = total, stride, entries = ranks.len(), "Coverage index built");

        Ok(Self { stride, ranks })
    }

    /// Universe ranks covered by candidate `candidate`.
    #[inline]
    pub fn coverage(&self, candidate: usize) -> &[u32] {
        let start = candidate * self.stride;
        &self.ranks[start..start + self.stride]
    }

    /// Ranks per candidate, `C(k, m)`.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Number of indexed candidates.
    pub fn len(&self) -> usize {
        if self.stride == 0 {
            0
        } else {
            self.ranks.len() / self.stride
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
