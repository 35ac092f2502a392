pub mod images;
pub mod report_sse;
pub mod train;
