use serde::Serialize;

use crate::metrics::MetricSample;

/// Per-epoch record produced by `fit`.
///
/// One is pushed onto the returned history after every completed epoch.
#[derive(Debug, Clone, Serialize)]
pub struct EpochStats {
    /// 0-based epoch index, as passed to the callbacks.
    pub epoch: usize,
    /// Total epochs requested for this run.
    pub total_epochs: usize,
    /// Number of batches trained in this epoch.
    pub batches: usize,
    /// Epoch-level metrics returned by the learner.
    pub metrics: MetricSample,
    /// Wall-clock duration of this single epoch in milliseconds.
    pub elapsed_ms: u64,
}
