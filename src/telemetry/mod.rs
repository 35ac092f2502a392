pub mod chart_buffer;
pub mod progress_sink;
pub mod format;
pub mod sampling;
pub mod config;
pub mod streamer;

pub use chart_buffer::{ChartBuffer, FlushPolicy};
pub use progress_sink::ProgressSink;
pub use config::StreamerConfig;
pub use streamer::TelemetryStreamer;
