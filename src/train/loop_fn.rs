use std::sync::atomic::Ordering;
use std::time::Instant;

use log::info;

use crate::error::{ReportError, Result};
use crate::train::callback::TrainingCallback;
use crate::train::epoch_stats::EpochStats;
use crate::train::learner::Learner;
use crate::train::train_config::FitConfig;

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Trains `learner` for `config.epochs` epochs, firing `callback` at every
/// lifecycle point, and returns the stats of every completed epoch.
///
/// Batches cover `learner.train_samples()` in order, `config.batch_size` at a
/// time; the last batch of an epoch holds the remainder.
///
/// # Early termination
/// The loop stops between epochs once `config.stop_flag` is set to `true`.
///
/// A callback error aborts the run immediately and is returned unchanged; no
/// further callbacks fire.
pub fn fit<L, C>(learner: &mut L, callback: &mut C, config: &FitConfig) -> Result<Vec<EpochStats>>
where
    L: Learner,
    C: TrainingCallback + ?Sized,
{
    let total_samples = learner.train_samples();
    if total_samples == 0 {
        return Err(ReportError::contract("learner has no training samples"));
    }
    if config.batch_size == 0 {
        return Err(ReportError::contract("batch_size must be at least 1"));
    }

    let mut history = Vec::with_capacity(config.epochs);

    callback.on_train_begin()?;

    for epoch in 0..config.epochs {
        // Check stop flag at the top of each epoch.
        if stop_requested(config) {
            info!("stop requested before epoch {}", epoch);
            break;
        }

        let t_start = Instant::now();
        callback.on_epoch_begin(epoch)?;

        // ── One full pass over the training data ───────────────────────────
        let mut batches = 0usize;
        for (batch, batch_start) in (0..total_samples).step_by(config.batch_size).enumerate() {
            let batch_end = (batch_start + config.batch_size).min(total_samples);
            let metrics = learner.train_batch(epoch, batch, batch_start..batch_end)?;
            callback.on_batch_end(batch, &metrics, batch_end - batch_start, total_samples)?;
            batches += 1;
        }

        let metrics = learner.end_epoch(epoch)?;
        callback.on_epoch_end(epoch, &metrics, &*learner)?;

        history.push(EpochStats {
            epoch,
            total_epochs: config.epochs,
            batches,
            metrics,
            elapsed_ms: t_start.elapsed().as_millis() as u64,
        });
    }

    Ok(history)
}

fn stop_requested(config: &FitConfig) -> bool {
    config
        .stop_flag
        .as_ref()
        .map(|flag| flag.load(Ordering::Relaxed))
        .unwrap_or(false)
}
