//! Saved selection types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cost::StakeAmounts;
use crate::engine::{Element, SolveRequest, Ticket};

/// Key the selection is stored under.
pub const STATE_KEY: &str = "wheel_state";

/// The user's last pool and settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedSelection {
    /// Selected numbers, ascending.
    pub pool: Vec<Element>,
    #[serde(default = "default_k")]
    pub k: usize,
    #[serde(default = "default_m")]
    pub m: usize,
    #[serde(default)]
    pub stakes: StakeAmounts,
    /// Tickets from the last successful solve of this pool.
    #[serde(default)]
    pub last_tickets: Option<Vec<Ticket>>,
    pub saved_at: DateTime<Utc>,
}

fn default_k() -> usize {
    4
}

fn default_m() -> usize {
    2
}

impl Default for SavedSelection {
    fn default() -> Self {
        Self {
            pool: Vec::new(),
            k: default_k(),
            m: default_m(),
            stakes: StakeAmounts::default(),
            last_tickets: None,
            saved_at: Utc::now(),
        }
    }
}

impl SavedSelection {
    /// Build a selection with its pool sorted.
    pub fn new(mut pool: Vec<Element>, k: usize, m: usize, stakes: StakeAmounts) -> Self {
        pool.sort_unstable();
        Self {
            pool,
            k,
            m,
            stakes,
            last_tickets: None,
            saved_at: Utc::now(),
        }
    }

    /// The solve request this selection describes.
    pub fn request(&self) -> SolveRequest {
        SolveRequest::new(self.pool.clone(), self.k, self.m)
    }
}
