use std::ops::Range;

use crate::error::Result;
use crate::metrics::MetricSample;

/// Anything that maps an input image to a class index.
pub trait Classifier {
    /// `input` is a normalized, row-major image.
    fn predict_class(&self, input: &[f32]) -> usize;
}

/// The model side of a training run, driven batch by batch by `fit`.
///
/// Implementations own the model, the optimizer and the training data; `fit`
/// only decides the batch layout and when callbacks fire.
pub trait Learner: Classifier {
    /// Number of training samples in one epoch.
    fn train_samples(&self) -> usize;

    /// Trains on the samples in `samples` (positions in this epoch's order)
    /// and returns the batch metrics, at least `loss` and `accuracy`.
    fn train_batch(&mut self, epoch: usize, batch: usize, samples: Range<usize>) -> Result<MetricSample>;

    /// Finishes an epoch and returns its metrics (typically including
    /// validation results).
    fn end_epoch(&mut self, epoch: usize) -> Result<MetricSample>;
}
