//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Covering runs (results, duration, ticket counts)
//! - Remote offload (attempts by outcome)

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, IntCounterVec, Opts};

// =============================================================================
// Engine Metrics
// =============================================================================

/// Covering runs by result.
pub static SOLVE_RUNS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("wheel_solve_runs_total", "Total covering runs"),
        &["result"], // "ok", "invalid_input", "too_large", "cancelled", ...
    )
    .unwrap()
});

/// Covering run duration in seconds.
pub static SOLVE_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "wheel_solve_duration_seconds",
            "Duration of local covering runs",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 15.0, 60.0, 300.0]),
    )
    .unwrap()
});

/// Tickets per successful run.
pub static TICKETS_GENERATED: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new("wheel_tickets_generated", "Tickets produced per run")
            .buckets(vec![1.0, 5.0, 10.0, 50.0, 100.0, 500.0, 1000.0, 10000.0]),
    )
    .unwrap()
});

// =============================================================================
// Offload Metrics
// =============================================================================

/// Remote solve attempts by outcome.
pub static OFFLOAD_ATTEMPTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("wheel_offload_attempts_total", "Remote solve attempts"),
        &["outcome"], // "ok", "timeout", "connection_failed", ...
    )
    .unwrap()
});

/// All core metrics, for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(SOLVE_RUNS.clone()),
        Box::new(SOLVE_DURATION.clone()),
        Box::new(TICKETS_GENERATED.clone()),
        Box::new(OFFLOAD_ATTEMPTS.clone()),
    ]
}
