use std::sync::Arc;
use wheel_core::{Config, Engine};

use crate::jobs::{JobRegistry, MAX_FINISHED_JOBS};

/// Shared application state
pub struct AppState {
    config: Config,
    engine: Engine,
    jobs: Arc<JobRegistry>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let engine = Engine::new(config.engine.clone());
        let jobs = Arc::new(JobRegistry::new(
            MAX_FINISHED_JOBS,
            config.server.max_running_jobs,
        ));
        Self {
            config,
            engine,
            jobs,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn jobs(&self) -> &Arc<JobRegistry> {
        &self.jobs
    }
}
