pub mod error;
pub mod metrics;
pub mod report;
pub mod telemetry;
pub mod train;
pub mod config;
pub mod run;

// Convenience re-exports
pub use error::{ReportError, SurfaceError, Result};
pub use metrics::{MetricSample, EpochContext};
pub use report::{ReportSurface, ReportSession, RecordingSurface, ReportOp, render_plain};
pub use telemetry::{TelemetryStreamer, StreamerConfig, ChartBuffer, ProgressSink};
pub use train::{TrainingCallback, Classifier, Learner, EvalSet, EpochStats, FitConfig, fit};
pub use config::RunConfig;
pub use run::{run_report, RunControl};
