//! Chooses between the local engine and a remote solver.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::OffloadConfig;
use crate::engine::{
    audit_cover, CancellationToken, Engine, EngineError, Plan, ProgressCallback, Solution,
    SolveRequest, SolveStats,
};
use crate::metrics::OFFLOAD_ATTEMPTS;

use super::{HttpRemoteSolver, OffloadError, RemoteSolveResponse, RemoteSolver};

/// Errors from a dispatched solve.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Remote solver at {endpoint} timed out; try fewer numbers or a smaller ticket size")]
    RemoteTimeout { endpoint: String },
}

/// Where a solution was computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SolveLocation {
    Local,
    Remote,
}

/// A solution and where it came from.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub solution: Solution,
    pub location: SolveLocation,
}

struct RemoteTarget {
    solver: Arc<dyn RemoteSolver>,
    threshold: u64,
}

/// Runs solves locally, or remotely when the input is large enough.
pub struct SolveDispatcher {
    engine: Engine,
    remote: Option<RemoteTarget>,
}

impl SolveDispatcher {
    /// Always solve locally.
    pub fn local(engine: Engine) -> Self {
        Self {
            engine,
            remote: None,
        }
    }

    /// Send requests whose candidate pool exceeds `threshold` to `solver`.
    pub fn with_remote(engine: Engine, solver: Arc<dyn RemoteSolver>, threshold: u64) -> Self {
        Self {
            engine,
            remote: Some(RemoteTarget { solver, threshold }),
        }
    }

    /// Build from an optional `[offload]` section.
    pub fn from_config(
        engine: Engine,
        offload: Option<&OffloadConfig>,
    ) -> Result<Self, OffloadError> {
        match offload {
            Some(config) => {
                let solver = HttpRemoteSolver::new(config)?;
                Ok(Self::with_remote(engine, Arc::new(solver), config.threshold))
            }
            None => Ok(Self::local(engine)),
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Validate, then solve remotely or locally.
    ///
    /// Validation always happens locally so bad input never reaches the
    /// remote. Remote failures other than a timeout fall back to the local
    /// engine.
    pub async fn solve(
        &self,
        request: SolveRequest,
        progress: Option<ProgressCallback>,
        cancel: CancellationToken,
    ) -> Result<DispatchOutcome, DispatchError> {
        let plan = self.engine.plan(&request)?;

        if let Some(remote) = self.remote.as_ref() {
            if plan.candidate_count > remote.threshold {
                match self.try_remote(remote, &plan).await {
                    Ok(solution) => {
                        OFFLOAD_ATTEMPTS.with_label_values(&["ok"]).inc();
                        if let Some(callback) = progress.as_ref() {
                            callback(1.0);
                        }
                        return Ok(DispatchOutcome {
                            solution,
                            location: SolveLocation::Remote,
                        });
                    }
                    Err(OffloadError::Timeout) => {
                        OFFLOAD_ATTEMPTS.with_label_values(&["timeout"]).inc();
                        warn!(endpoint = remote.solver.endpoint(), "Remote solve timed out");
                        return Err(DispatchError::RemoteTimeout {
                            endpoint: remote.solver.endpoint().to_string(),
                        });
                    }
                    Err(e) => {
                        OFFLOAD_ATTEMPTS.with_label_values(&[e.kind()]).inc();
                        warn!(
                            endpoint = remote.solver.endpoint(),
                            error = %e,
                            "Remote solve failed, falling back to local engine"
                        );
                    }
                }
            }
        }

        let solution = self.engine.solve_plan(plan, progress, cancel).await?;
        Ok(DispatchOutcome {
            solution,
            location: SolveLocation::Local,
        })
    }

    async fn try_remote(
        &self,
        remote: &RemoteTarget,
        plan: &Plan,
    ) -> Result<Solution, OffloadError> {
        info!(
            endpoint = remote.solver.endpoint(),
            candidates = plan.candidate_count,
            threshold = remote.threshold,
            "Offloading solve"
        );
        let request = SolveRequest::new(plan.pool.clone(), plan.k, plan.m);
        let response = remote.solver.solve(&request).await?;
        verify_remote(plan, response)
    }
}

/// Check remote tickets against the pool and rebuild the coverage
/// statistics from an independent audit.
///
/// Tickets must hold `k` strictly increasing numbers and appear once each.
/// The remote's phase split and timing are kept only when they add up to
/// the ticket count.
fn verify_remote(plan: &Plan, response: RemoteSolveResponse) -> Result<Solution, OffloadError> {
    if let Some(bad) = response.tickets.iter().find(|t| t.len() != plan.k) {
        return Err(OffloadError::InvalidResponse(format!(
            "ticket {:?} does not have {} numbers",
            bad, plan.k
        )));
    }
    if let Some(bad) = response
        .tickets
        .iter()
        .find(|t| !t.windows(2).all(|w| w[0] < w[1]))
    {
        return Err(OffloadError::InvalidResponse(format!(
            "ticket {bad:?} is not strictly increasing"
        )));
    }

    let report = audit_cover(&plan.pool, plan.m, &response.tickets)
        .map_err(|e| OffloadError::InvalidResponse(e.to_string()))?;
    if report.duplicate_tickets > 0 {
        return Err(OffloadError::InvalidResponse(format!(
            "{} duplicate tickets",
            report.duplicate_tickets
        )));
    }
    if !report.fully_certified {
        return Err(OffloadError::InvalidResponse(format!(
            "tickets cover {} of {} subsets",
            report.covered, report.universe_size
        )));
    }

    let ticket_count = response.tickets.len();
    let (greedy_tickets, forced_tickets, iterations, elapsed_ms) = match response.stats {
        Some(stats)
            if stats.ticket_count == ticket_count
                && stats.greedy_tickets + stats.forced_tickets == ticket_count =>
        {
            (
                stats.greedy_tickets,
                stats.forced_tickets,
                stats.iterations,
                stats.elapsed_ms,
            )
        }
        Some(stats) => {
            warn!(
                reported = stats.ticket_count,
                actual = ticket_count,
                "Remote statistics disagree with its tickets; using audited values"
            );
            (ticket_count, 0, 0, 0)
        }
        None => (ticket_count, 0, 0, 0),
    };

    let stats = SolveStats {
        universe_size: report.universe_size,
        candidate_pool_size: plan.candidate_count,
        greedy_tickets,
        forced_tickets,
        ticket_count,
        covered: report.covered,
        uncovered: report.universe_size - report.covered,
        coverage_percent: report.coverage_percent,
        reduction_percent: (1.0 - ticket_count as f64 / plan.candidate_count as f64) * 100.0,
        fully_certified: report.fully_certified,
        iterations,
        elapsed_ms,
    };

    Ok(Solution {
        tickets: response.tickets,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockRemoteSolver;

    fn request() -> SolveRequest {
        SolveRequest::new(vec![1, 2, 3, 4, 5], 3, 2)
    }

    fn remote_tickets() -> Vec<Vec<i64>> {
        // Covers every pair of 1..=5.
        vec![vec![1, 2, 3], vec![1, 4, 5], vec![2, 4, 5], vec![3, 4, 5]]
    }

    #[tokio::test]
    async fn test_local_dispatcher_uses_engine() {
        let dispatcher = SolveDispatcher::local(Engine::default());
        let outcome = dispatcher
            .solve(request(), None, CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome.location, SolveLocation::Local);
        assert!(outcome.solution.stats.fully_certified);
    }

    #[tokio::test]
    async fn test_below_threshold_stays_local() {
        let mock = Arc::new(MockRemoteSolver::new());
        let dispatcher = SolveDispatcher::with_remote(Engine::default(), mock.clone(), 10);

        // C(5, 3) = 10 is not above the threshold.
        let outcome = dispatcher
            .solve(request(), None, CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome.location, SolveLocation::Local);
        assert!(mock.recorded_requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_above_threshold_goes_remote_and_fills_stats() {
        let mock = Arc::new(MockRemoteSolver::new());
        mock.set_response(RemoteSolveResponse {
            tickets: remote_tickets(),
            stats: None,
        })
        .await;
        let dispatcher = SolveDispatcher::with_remote(Engine::default(), mock.clone(), 5);

        let outcome = dispatcher
            .solve(request(), None, CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome.location, SolveLocation::Remote);
        assert_eq!(outcome.solution.tickets, remote_tickets());
        let stats = &outcome.solution.stats;
        assert_eq!(stats.universe_size, 10);
        assert_eq!(stats.candidate_pool_size, 10);
        assert_eq!(stats.ticket_count, 4);
        assert!(stats.fully_certified);
        assert_eq!(mock.recorded_requests().await, vec![request()]);
    }

    #[tokio::test]
    async fn test_connection_failure_falls_back_to_local() {
        let mock = Arc::new(MockRemoteSolver::new());
        mock.set_next_error(OffloadError::ConnectionFailed("refused".to_string()))
            .await;
        let dispatcher = SolveDispatcher::with_remote(Engine::default(), mock.clone(), 0);

        let outcome = dispatcher
            .solve(request(), None, CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome.location, SolveLocation::Local);
        assert_eq!(mock.recorded_requests().await.len(), 1);
    }

    #[tokio::test]
    async fn test_incomplete_remote_cover_falls_back_to_local() {
        let mock = Arc::new(MockRemoteSolver::new());
        mock.set_response(RemoteSolveResponse {
            tickets: vec![vec![1, 2, 3]],
            stats: None,
        })
        .await;
        let dispatcher = SolveDispatcher::with_remote(Engine::default(), mock, 0);

        let outcome = dispatcher
            .solve(request(), None, CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome.location, SolveLocation::Local);
        assert!(outcome.solution.stats.fully_certified);
    }

    #[tokio::test]
    async fn test_foreign_elements_fall_back_to_local() {
        let mock = Arc::new(MockRemoteSolver::new());
        mock.set_response(RemoteSolveResponse {
            tickets: vec![vec![1, 2, 99]],
            stats: None,
        })
        .await;
        let dispatcher = SolveDispatcher::with_remote(Engine::default(), mock, 0);

        let outcome = dispatcher
            .solve(request(), None, CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome.location, SolveLocation::Local);
    }

    #[tokio::test]
    async fn test_unsorted_remote_tickets_fall_back_to_local() {
        let mock = Arc::new(MockRemoteSolver::new());
        mock.set_response(RemoteSolveResponse {
            tickets: vec![vec![3, 2, 1], vec![5, 4, 1], vec![2, 4, 5], vec![3, 4, 5]],
            stats: None,
        })
        .await;
        let dispatcher = SolveDispatcher::with_remote(Engine::default(), mock.clone(), 0);

        let outcome = dispatcher
            .solve(request(), None, CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome.location, SolveLocation::Local);
        assert!(outcome
            .solution
            .tickets
            .iter()
            .all(|t| t.windows(2).all(|w| w[0] < w[1])));
        assert_eq!(mock.recorded_requests().await.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_remote_tickets_fall_back_to_local() {
        let mut tickets = remote_tickets();
        tickets.push(vec![3, 4, 5]);
        let mock = Arc::new(MockRemoteSolver::new());
        mock.set_response(RemoteSolveResponse {
            tickets,
            stats: None,
        })
        .await;
        let dispatcher = SolveDispatcher::with_remote(Engine::default(), mock, 0);

        let outcome = dispatcher
            .solve(request(), None, CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome.location, SolveLocation::Local);
        let report = audit_cover(&[1, 2, 3, 4, 5], 2, &outcome.solution.tickets).unwrap();
        assert_eq!(report.duplicate_tickets, 0);
    }

    #[tokio::test]
    async fn test_remote_stats_are_rebuilt_from_audit() {
        let mock = Arc::new(MockRemoteSolver::new());
        mock.set_response(RemoteSolveResponse {
            tickets: remote_tickets(),
            stats: Some(SolveStats {
                universe_size: 99,
                candidate_pool_size: 99,
                greedy_tickets: 7,
                forced_tickets: 0,
                ticket_count: 7,
                covered: 3,
                uncovered: 96,
                coverage_percent: 3.0,
                reduction_percent: 50.0,
                fully_certified: false,
                iterations: 7,
                elapsed_ms: 12,
            }),
        })
        .await;
        let dispatcher = SolveDispatcher::with_remote(Engine::default(), mock, 0);

        let outcome = dispatcher
            .solve(request(), None, CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome.location, SolveLocation::Remote);
        let stats = &outcome.solution.stats;
        assert_eq!(stats.ticket_count, 4);
        assert_eq!(stats.greedy_tickets, 4);
        assert_eq!(stats.universe_size, 10);
        assert_eq!(stats.covered, 10);
        assert_eq!(stats.uncovered, 0);
        assert!(stats.fully_certified);
        assert_eq!(stats.iterations, 0);
    }

    #[tokio::test]
    async fn test_timeout_is_reported_not_retried() {
        let mock = Arc::new(MockRemoteSolver::new());
        mock.set_next_error(OffloadError::Timeout).await;
        let dispatcher = SolveDispatcher::with_remote(Engine::default(), mock.clone(), 0);

        let err = dispatcher
            .solve(request(), None, CancellationToken::new())
            .await
            .unwrap_err();
        match err {
            DispatchError::RemoteTimeout { endpoint } => assert_eq!(endpoint, "mock://remote"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(mock.recorded_requests().await.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_remote() {
        let mock = Arc::new(MockRemoteSolver::new());
        let dispatcher = SolveDispatcher::with_remote(Engine::default(), mock.clone(), 0);

        let err = dispatcher
            .solve(
                SolveRequest::new(vec![1, 2, 3, 4, 5], 3, 4),
                None,
                CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Engine(EngineError::InvalidInput(_))
        ));
        assert!(mock.recorded_requests().await.is_empty());
    }

    #[test]
    fn test_from_config_without_offload_is_local() {
        let dispatcher = SolveDispatcher::from_config(Engine::default(), None).unwrap();
        assert!(dispatcher.remote.is_none());
    }

    #[test]
    fn test_from_config_with_offload() {
        let config = OffloadConfig {
            url: "http://compute:8080".to_string(),
            timeout_secs: 5,
            threshold: 1000,
        };
        let dispatcher = SolveDispatcher::from_config(Engine::default(), Some(&config)).unwrap();
        let remote = dispatcher.remote.as_ref().unwrap();
        assert_eq!(remote.threshold, 1000);
        assert_eq!(remote.solver.endpoint(), "http://compute:8080/api/v1/solve");
    }
}
