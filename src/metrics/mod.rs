pub mod sample;
pub mod epoch_context;

pub use sample::{MetricSample, LOSS, ACCURACY};
pub use epoch_context::{EpochContext, completion_percent};
