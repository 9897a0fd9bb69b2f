//! Mock remote solver for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::engine::SolveRequest;
use crate::offload::{OffloadError, RemoteSolveResponse, RemoteSolver};

/// Mock implementation of the RemoteSolver trait.
///
/// Returns a configured response (an empty ticket list by default),
/// records every request, and can be told to fail the next call.
///
/// # Example
///
/// ```rust,ignore
/// use wheel_core::testing::MockRemoteSolver;
///
/// let remote = Arc::new(MockRemoteSolver::new());
/// remote.set_next_error(OffloadError::Timeout).await;
///
/// let dispatcher = SolveDispatcher::with_remote(Engine::default(), remote.clone(), 0);
/// // ...
/// assert_eq!(remote.recorded_requests().await.len(), 1);
/// ```
pub struct MockRemoteSolver {
    endpoint: String,
    /// Response returned on success.
    response: Arc<RwLock<RemoteSolveResponse>>,
    /// Recorded requests.
    requests: Arc<RwLock<Vec<SolveRequest>>>,
    /// If set, the next solve fails with this error.
    next_error: Arc<RwLock<Option<OffloadError>>>,
}

impl std::fmt::Debug for MockRemoteSolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockRemoteSolver")
            .field("endpoint", &self.endpoint)
            .field("response", &"<response>")
            .field("requests", &"<requests>")
            .field("next_error", &"<next_error>")
            .finish()
    }
}

impl Default for MockRemoteSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRemoteSolver {
    pub fn new() -> Self {
        Self {
            endpoint: "mock://remote".to_string(),
            response: Arc::new(RwLock::new(RemoteSolveResponse {
                tickets: Vec::new(),
                stats: None,
            })),
            requests: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Set the response returned by successful solves.
    pub async fn set_response(&self, response: RemoteSolveResponse) {
        *self.response.write().await = response;
    }

    /// Make the next solve fail.
    pub async fn set_next_error(&self, error: OffloadError) {
        *self.next_error.write().await = Some(error);
    }

    /// Requests received so far.
    pub async fn recorded_requests(&self) -> Vec<SolveRequest> {
        self.requests.read().await.clone()
    }
}

#[async_trait]
impl RemoteSolver for MockRemoteSolver {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn solve(&self, request: &SolveRequest) -> Result<RemoteSolveResponse, OffloadError> {
        self.requests.write().await.push(request.clone());

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }
        Ok(self.response.read().await.clone())
    }
}
