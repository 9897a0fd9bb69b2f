//! Background job endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use wheel_core::SolveRequest;

use super::errors::{engine_error, not_found, too_many_jobs, ApiError};
use crate::jobs::JobView;
use crate::state::AppState;

/// POST /api/v1/jobs
///
/// Validates synchronously, then starts the run in the background.
/// Answers 429 while the running-job limit is reached.
pub async fn create_job(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SolveRequest>,
) -> Result<(StatusCode, Json<JobView>), ApiError> {
    let plan = state.engine().plan(&request).map_err(engine_error)?;
    let view = state
        .jobs()
        .start(state.engine().clone(), plan)
        .await
        .map_err(too_many_jobs)?;
    Ok((StatusCode::ACCEPTED, Json(view)))
}

/// GET /api/v1/jobs
pub async fn list_jobs(State(state): State<Arc<AppState>>) -> Json<Vec<JobView>> {
    Json(state.jobs().list().await)
}

/// GET /api/v1/jobs/{id}
pub async fn get_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<JobView>, ApiError> {
    state
        .jobs()
        .get(&id)
        .await
        .map(Json)
        .ok_or_else(|| not_found(format!("Job not found: {}", id)))
}

/// DELETE /api/v1/jobs/{id}
pub async fn cancel_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<JobView>, ApiError> {
    state
        .jobs()
        .cancel(&id)
        .await
        .map(Json)
        .ok_or_else(|| not_found(format!("Job not found: {}", id)))
}
