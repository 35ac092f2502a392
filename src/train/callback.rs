use crate::error::Result;
use crate::metrics::MetricSample;
use crate::train::learner::Classifier;

/// Hooks the training loop fires, in this order per run:
///
/// ```text
/// on_train_begin
/// for each epoch (increasing):
///     on_epoch_begin
///     on_batch_end  x N  (batch index 0..N, restarting every epoch)
///     on_epoch_end
/// ```
///
/// Every hook runs to completion before training continues. An `Err`
/// aborts the run; the loop does not call any further hooks.
///
/// All methods default to doing nothing, so implementors only override the
/// events they care about.
pub trait TrainingCallback {
    fn on_train_begin(&mut self) -> Result<()> {
        Ok(())
    }

    fn on_epoch_begin(&mut self, _epoch: usize) -> Result<()> {
        Ok(())
    }

    /// `batch_size` is the size of this batch (the last one may be short);
    /// `total_samples` is the number of training samples in one epoch.
    fn on_batch_end(
        &mut self,
        _batch: usize,
        _metrics: &MetricSample,
        _batch_size: usize,
        _total_samples: usize,
    ) -> Result<()> {
        Ok(())
    }

    /// `model` is the model as trained so far, for callbacks that want to
    /// look at its predictions.
    fn on_epoch_end(&mut self, _epoch: usize, _metrics: &MetricSample, _model: &dyn Classifier) -> Result<()> {
        Ok(())
    }
}

impl<C: TrainingCallback + ?Sized> TrainingCallback for &mut C {
    fn on_train_begin(&mut self) -> Result<()> {
        (**self).on_train_begin()
    }

    fn on_epoch_begin(&mut self, epoch: usize) -> Result<()> {
        (**self).on_epoch_begin(epoch)
    }

    fn on_batch_end(
        &mut self,
        batch: usize,
        metrics: &MetricSample,
        batch_size: usize,
        total_samples: usize,
    ) -> Result<()> {
        (**self).on_batch_end(batch, metrics, batch_size, total_samples)
    }

    fn on_epoch_end(&mut self, epoch: usize, metrics: &MetricSample, model: &dyn Classifier) -> Result<()> {
        (**self).on_epoch_end(epoch, metrics, model)
    }
}
