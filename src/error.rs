use thiserror::Error;

/// Failures reported by a `ReportSurface` implementation.
#[derive(Error, Debug)]
pub enum SurfaceError {
    #[error("report surface is closed")]
    Closed,

    #[error("report consumer disconnected")]
    Disconnected,

    #[error("unknown report element #{0}")]
    UnknownElement(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced to the training loop by the telemetry pipeline.
///
/// `Contract` and `MissingMetric` are caller mistakes; the streamer holds no
/// fallback rendering for them, so the run is expected to abort.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("metric '{0}' missing from sample")]
    MissingMetric(String),

    #[error("lifecycle contract violated: {0}")]
    Contract(String),

    #[error("evaluation set holds {available} examples, {required} required")]
    EvalSetTooSmall { required: usize, available: usize },

    #[error("rendering failed: {0}")]
    Surface(#[from] SurfaceError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReportError {
    pub fn contract(msg: impl Into<String>) -> Self {
        ReportError::Contract(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
