use std::sync::{Arc, atomic::AtomicBool};

/// Configuration for a `fit` run.
///
/// # Fields
/// - `epochs`     : total number of full passes over the training data
/// - `batch_size` : samples per batch; the last batch of an epoch may be short
/// - `stop_flag`  : optional atomic flag; when set to `true` from another
///                   thread the loop terminates after the current epoch.
pub struct FitConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub stop_flag: Option<Arc<AtomicBool>>,
}

impl FitConfig {
    /// Creates a minimal `FitConfig` with no stop flag.
    pub fn new(epochs: usize, batch_size: usize) -> Self {
        FitConfig {
            epochs,
            batch_size,
            stop_flag: None,
        }
    }
}
