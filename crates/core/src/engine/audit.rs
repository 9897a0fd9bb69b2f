//! Independent coverage check of a ticket list.

use serde::{Deserialize, Serialize};

use super::bitset::CoverSet;
use super::coverage::Universe;
use super::subset::{binomial, IndexCombinations, MAX_POOL_SIZE};
use super::{Element, EngineError, Ticket};

/// How much of the `m`-subset universe a ticket list covers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageReport {
    pub universe_size: u64,
    pub covered: u64,
    pub coverage_percent: f64,
    pub fully_certified: bool,
    /// Tickets that appear more than once.
    pub duplicate_tickets: usize,
}

/// Expand every ticket into its `m`-subsets and measure how much of the
/// pool's universe they reach.
///
/// Fails with [`EngineError::InvalidInput`] if a ticket holds an element
/// outside the pool or repeats an element.
pub fn audit_cover(
    pool: &[Element],
    m: usize,
    tickets: &[Ticket],
) -> Result<CoverageReport, EngineError> {
    let mut sorted = pool.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    let n = sorted.len();

    if m == 0 || m > n {
        return Err(EngineError::InvalidInput(format!(
            "guarantee size {m} does not fit a pool of {n} numbers"
        )));
    }
    if n > MAX_POOL_SIZE {
        return Err(EngineError::TooLarge {
            resource: "pool size",
            limit: MAX_POOL_SIZE as u64,
        });
    }
    let universe_size = binomial(n as u64, m as u64)
        .filter(|&size| size <= u64::from(u32::MAX))
        .ok_or(EngineError::TooLarge {
            resource: "universe size",
            limit: u64::from(u32::MAX),
        })?;

    let universe = Universe::new(n, m);
    let mut covered = CoverSet::empty(universe.size());
    let mut seen = std::collections::HashSet::new();
    let mut duplicate_tickets = 0;
    let mut positions = Vec::new();

    for ticket in tickets {
        positions.clear();
        for element in ticket {
            let position = sorted.binary_search(element).map_err(|_| {
                EngineError::InvalidInput(format!("ticket element {element} is not in the pool"))
            })?;
            positions.push(position);
        }
        positions.sort_unstable();
        if positions.windows(2).any(|w| w[0] == w[1]) {
            return Err(EngineError::InvalidInput(format!(
                "ticket {ticket:?} repeats an element"
            )));
        }
        if !seen.insert(positions.clone()) {
            duplicate_tickets += 1;
        }

        let mut combos = IndexCombinations::new(positions.len(), m);
        while let Some(picked) = combos.next_positions() {
            covered.insert(universe.rank(picked.iter().map(|&j| positions[j])));
        }
    }

    let covered = covered.len() as u64;
    Ok(CoverageReport {
        universe_size,
        covered,
        coverage_percent: covered as f64 / universe_size as f64 * 100.0,
        fully_certified: covered == universe_size,
        duplicate_tickets,
    })
}
