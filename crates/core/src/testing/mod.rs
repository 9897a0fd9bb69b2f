//! Testing utilities and mock implementations.
//!
//! Mocks stand in for external services so dispatch and server paths can
//! be exercised without a remote solve service.

mod mock_remote_solver;

pub use mock_remote_solver::MockRemoteSolver;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::engine::{Element, SolveRequest};

    /// Pool of consecutive numbers `1..=n`.
    pub fn pool(n: usize) -> Vec<Element> {
        (1..=n as Element).collect()
    }

    /// Request over `1..=n`.
    pub fn request(n: usize, k: usize, m: usize) -> SolveRequest {
        SolveRequest::new(pool(n), k, m)
    }
}
