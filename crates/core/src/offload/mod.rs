//! Remote solving with local fallback.
//!
//! Large inputs can be sent to a remote solve service (a `wheel-server`
//! instance). The [`SolveDispatcher`] picks the location per request and
//! falls back to the local [`Engine`](crate::engine::Engine) when the
//! remote is unreachable or answers with something unusable.

mod dispatcher;
mod http;

pub use dispatcher::{DispatchError, DispatchOutcome, SolveDispatcher, SolveLocation};
pub use http::HttpRemoteSolver;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::{SolveRequest, SolveStats, Ticket};

/// Errors from a remote solver.
#[derive(Debug, Clone, Error)]
pub enum OffloadError {
    #[error("Remote solver timed out")]
    Timeout,

    #[error("Connection to remote solver failed: {0}")]
    ConnectionFailed(String),

    #[error("Remote solver returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response from remote solver: {0}")]
    InvalidResponse(String),
}

impl OffloadError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            OffloadError::Timeout => "timeout",
            OffloadError::ConnectionFailed(_) => "connection_failed",
            OffloadError::Api { .. } => "api_error",
            OffloadError::InvalidResponse(_) => "invalid_response",
        }
    }
}

/// Body of a successful remote solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteSolveResponse {
    pub tickets: Vec<Ticket>,
    #[serde(default)]
    pub stats: Option<SolveStats>,
}

/// A service that can run a solve elsewhere.
#[async_trait]
pub trait RemoteSolver: Send + Sync {
    /// Where requests go, for logs and error messages.
    fn endpoint(&self) -> &str;

    /// Solve the request remotely.
    async fn solve(&self, request: &SolveRequest) -> Result<RemoteSolveResponse, OffloadError>;
}
