//! Background solve jobs.
//!
//! A job wraps one engine run on the blocking pool. Clients poll its
//! progress and may cancel it; finished jobs are kept for a while so their
//! results can be fetched.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use wheel_core::{
    CancellationToken, Engine, EngineError, Plan, ProgressCallback, Solution, SolveRequest,
};

use crate::metrics::JOBS_ACTIVE;

/// Finished jobs kept before the oldest are evicted.
pub const MAX_FINISHED_JOBS: usize = 100;

/// Jobs allowed to run at once unless configured otherwise.
pub const DEFAULT_MAX_RUNNING_JOBS: usize = 4;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Too many running jobs (limit {limit}); retry when one finishes")]
pub struct JobLimitReached {
    pub limit: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn is_finished(self) -> bool {
        self != JobStatus::Running
    }
}

/// Snapshot of a job as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct JobView {
    pub id: String,
    pub status: JobStatus,
    pub progress: f64,
    pub request: SolveRequest,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Solution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

struct JobEntry {
    request: SolveRequest,
    status: JobStatus,
    /// f64 bits of the latest progress fraction.
    progress: Arc<AtomicU64>,
    cancel: CancellationToken,
    created_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    result: Option<Solution>,
    error: Option<String>,
}

impl JobEntry {
    fn view(&self, id: &str) -> JobView {
        JobView {
            id: id.to_string(),
            status: self.status,
            progress: f64::from_bits(self.progress.load(Ordering::Relaxed)),
            request: self.request.clone(),
            created_at: self.created_at,
            finished_at: self.finished_at,
            result: self.result.clone(),
            error: self.error.clone(),
        }
    }
}

/// In-memory registry of solve jobs.
pub struct JobRegistry {
    jobs: RwLock<HashMap<String, JobEntry>>,
    max_finished: usize,
    max_running: usize,
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new(MAX_FINISHED_JOBS, DEFAULT_MAX_RUNNING_JOBS)
    }
}

impl JobRegistry {
    pub fn new(max_finished: usize, max_running: usize) -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
            max_finished,
            max_running,
        }
    }

    /// Register a job for `plan` and start it in the background.
    ///
    /// Fails without starting anything when `max_running` jobs are already
    /// running.
    pub async fn start(
        self: &Arc<Self>,
        engine: Engine,
        plan: Plan,
    ) -> Result<JobView, JobLimitReached> {
        let id = Uuid::new_v4().to_string();
        let progress = Arc::new(AtomicU64::new(0f64.to_bits()));
        let cancel = CancellationToken::new();

        let entry = JobEntry {
            request: SolveRequest::new(plan.pool.clone(), plan.k, plan.m),
            status: JobStatus::Running,
            progress: Arc::clone(&progress),
            cancel: cancel.clone(),
            created_at: Utc::now(),
            finished_at: None,
            result: None,
            error: None,
        };
        let view = entry.view(&id);
        {
            let mut jobs = self.jobs.write().await;
            let running = jobs
                .values()
                .filter(|entry| entry.status == JobStatus::Running)
                .count();
            if running >= self.max_running {
                warn!(running, limit = self.max_running, "Job limit reached");
                return Err(JobLimitReached {
                    limit: self.max_running,
                });
            }
            jobs.insert(id.clone(), entry);
        }
        JOBS_ACTIVE.inc();
        info!(job_id = %id, candidates = plan.candidate_count, "Job started");

        let callback: ProgressCallback = {
            let progress = Arc::clone(&progress);
            Arc::new(move |fraction: f64| progress.store(fraction.to_bits(), Ordering::Relaxed))
        };

        let registry = Arc::clone(self);
        let job_id = id.clone();
        tokio::spawn(async move {
            let result = engine.solve_plan(plan, Some(callback), cancel).await;
            registry.finish(&job_id, result).await;
        });

        Ok(view)
    }

    async fn finish(&self, id: &str, result: Result<Solution, EngineError>) {
        let mut jobs = self.jobs.write().await;
        if let Some(entry) = jobs.get_mut(id) {
            entry.finished_at = Some(Utc::now());
            match result {
                Ok(solution) => {
                    entry.status = JobStatus::Completed;
                    entry.result = Some(solution);
                }
                Err(EngineError::Cancelled) => {
                    entry.status = JobStatus::Cancelled;
                    entry.error = Some(EngineError::Cancelled.to_string());
                }
                Err(e) => {
                    entry.status = JobStatus::Failed;
                    entry.error = Some(e.to_string());
                }
            }
            info!(job_id = %id, status = ?entry.status, "Job finished");
        }
        JOBS_ACTIVE.dec();
        Self::evict_finished(&mut jobs, self.max_finished);
    }

    fn evict_finished(jobs: &mut HashMap<String, JobEntry>, max_finished: usize) {
        let mut finished: Vec<(String, DateTime<Utc>)> = jobs
            .iter()
            .filter(|(_, entry)| entry.status.is_finished())
            .map(|(id, entry)| (id.clone(), entry.finished_at.unwrap_or(entry.created_at)))
            .collect();
        if finished.len() <= max_finished {
            return;
        }
        finished.sort_by_key(|(_, at)| *at);
        let excess = finished.len() - max_finished;
        for (id, _) in finished.into_iter().take(excess) {
            debug!(job_id = %id, "Evicting finished job");
            jobs.remove(&id);
        }
    }

    pub async fn get(&self, id: &str) -> Option<JobView> {
        self.jobs.read().await.get(id).map(|entry| entry.view(id))
    }

    /// All jobs, newest first.
    pub async fn list(&self) -> Vec<JobView> {
        let jobs = self.jobs.read().await;
        let mut views: Vec<JobView> = jobs.iter().map(|(id, entry)| entry.view(id)).collect();
        views.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        views
    }

    /// Request cancellation. Finished jobs are returned unchanged.
    pub async fn cancel(&self, id: &str) -> Option<JobView> {
        let jobs = self.jobs.read().await;
        let entry = jobs.get(id)?;
        if entry.status == JobStatus::Running {
            info!(job_id = %id, "Cancelling job");
            entry.cancel.cancel();
        }
        Some(entry.view(id))
    }
}
