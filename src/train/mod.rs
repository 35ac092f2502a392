pub mod callback;
pub mod learner;
pub mod eval_set;
pub mod epoch_stats;
pub mod train_config;
pub mod loop_fn;
pub mod simulated;

pub use callback::TrainingCallback;
pub use learner::{Classifier, Learner};
pub use eval_set::EvalSet;
pub use epoch_stats::EpochStats;
pub use train_config::FitConfig;
pub use loop_fn::fit;
pub use simulated::{SimulatedLearner, synthetic_glyphs};
