pub mod api;
pub mod jobs;
pub mod metrics;
pub mod state;
