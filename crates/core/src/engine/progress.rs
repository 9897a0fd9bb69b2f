//! Progress reporting and cancellation checkpoints.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::EngineError;

/// Receives the overall run fraction in `[0, 1]`.
pub type ProgressCallback = Arc<dyn Fn(f64) + Send + Sync>;

/// Smallest progress increase forwarded to the callback.
const MIN_PROGRESS_STEP: f64 = 0.01;

/// Shared flag polled by the engine at its checkpoints.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Forwards progress to the caller and polls cancellation for one run.
///
/// Reported fractions never decrease, are clamped to `[0, 1]`, and
/// increments below one percent are coalesced.
pub(crate) struct RunMonitor {
    callback: Option<ProgressCallback>,
    cancel: CancellationToken,
    last_reported: Option<f64>,
}

impl RunMonitor {
    pub(crate) fn new(callback: Option<ProgressCallback>, cancel: CancellationToken) -> Self {
        Self {
            callback,
            cancel,
            last_reported: None,
        }
    }

    pub(crate) fn report(&mut self, fraction: f64) {
        let fraction = fraction.clamp(0.0, 1.0);
        if let Some(last) = self.last_reported {
            if fraction < last + MIN_PROGRESS_STEP && fraction < 1.0 {
                return;
            }
            if last >= 1.0 {
                return;
            }
        }
        self.last_reported = Some(fraction);
        if let Some(callback) = &self.callback {
            callback(fraction);
        }
    }

    /// Report exactly 1.0 unless it was already reported.
    pub(crate) fn finish(&mut self) {
        self.report(1.0);
    }

    pub(crate) fn check(&self) -> Result<(), EngineError> {
        if self.cancel.is_cancelled() {
            Err(EngineError::Cancelled)
        } else {
            Ok(())
        }
    }
}
