//! Synchronous solve endpoint, used as the offload target.

use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::{debug, info};
use wheel_core::{CancellationToken, Solution, SolveRequest};

use super::errors::{engine_error, ApiError};
use crate::state::AppState;

/// Cancels the run when the handler future is dropped, e.g. when the
/// client disconnects or gives up before the solve finishes.
struct CancelOnDrop {
    token: CancellationToken,
    finished: bool,
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if !self.finished {
            debug!("Solve request abandoned, cancelling run");
            self.token.cancel();
        }
    }
}

/// POST /api/v1/solve
///
/// Runs the engine to completion and returns tickets with statistics.
pub async fn solve(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SolveRequest>,
) -> Result<Json<Solution>, ApiError> {
    info!(n = request.pool.len(), k = request.k, m = request.m, "Solve requested");
    let mut guard = CancelOnDrop {
        token: CancellationToken::new(),
        finished: false,
    };
    let result = state
        .engine()
        .solve(request, None, guard.token.clone())
        .await;
    guard.finished = true;
    Ok(Json(result.map_err(engine_error)?))
}
