pub mod chart;
pub mod surface;
pub mod op;
pub mod recording;
pub mod plain;
pub mod session;

pub use chart::{ChartKind, ChartSpec, AxisSpec, AxisOrientation, SeriesSpec};
pub use surface::{ReportSurface, AlertKind, TextHandle, ProgressHandle, ChartHandle};
pub use op::{ReportOp, ImageTile};
pub use recording::{RecordingSurface, Block};
pub use plain::render_plain;
pub use session::ReportSession;
