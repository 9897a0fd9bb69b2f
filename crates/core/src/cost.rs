//! Ticket cost calculation.
//!
//! A ticket of `k` numbers is played on every winning class it can hold:
//! `k` singles, `C(k, 2)` pairs, `C(k, 3)` triples and `C(k, 4)` quads, each
//! at its own stake.

use serde::{Deserialize, Serialize};

use crate::engine::{binomial, Ticket};

/// Stake per combination class, in currency units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StakeAmounts {
    #[serde(default)]
    pub single: f64,
    #[serde(default = "default_pair")]
    pub pair: f64,
    #[serde(default = "default_triple")]
    pub triple: f64,
    #[serde(default = "default_quad")]
    pub quad: f64,
}

fn default_pair() -> f64 {
    0.5
}

fn default_triple() -> f64 {
    0.5
}

fn default_quad() -> f64 {
    1.0
}

impl Default for StakeAmounts {
    fn default() -> Self {
        Self {
            single: 0.0,
            pair: default_pair(),
            triple: default_triple(),
            quad: default_quad(),
        }
    }
}

/// Cost of one ticket of `k` numbers.
pub fn ticket_cost(k: usize, stakes: &StakeAmounts) -> f64 {
    let k = k as u64;
    let classes = [stakes.single, stakes.pair, stakes.triple, stakes.quad];
    classes
        .iter()
        .zip(1u64..)
        .map(|(stake, size)| binomial(k, size).unwrap_or(0) as f64 * stake)
        .sum()
}

/// Cost summary of a ticket list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub tickets: usize,
    pub total: f64,
}

/// Total cost of playing every ticket.
pub fn system_cost(tickets: &[Ticket], stakes: &StakeAmounts) -> CostBreakdown {
    CostBreakdown {
        tickets: tickets.len(),
        total: tickets.iter().map(|t| ticket_cost(t.len(), stakes)).sum(),
    }
}
