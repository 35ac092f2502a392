use image::GrayImage;
use serde::Serialize;

use crate::metrics::MetricSample;
use crate::report::chart::ChartSpec;
use crate::report::surface::AlertKind;

/// One example tile of an image grid.
///
/// The pixels travel with the op (so the studio can serve them) but are not
/// part of the JSON form; clients fetch them by `id`.
#[derive(Debug, Clone, Serialize)]
pub struct ImageTile {
    pub id: u64,
    pub width: u32,
    pub height: u32,
    #[serde(skip)]
    pub pixels: GrayImage,
}

/// Serializable record of a single `ReportSurface` call.
///
/// A report is fully described by its ops in call order: replaying them on
/// an empty page reproduces the report.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ReportOp {
    Header { text: String, level: u8 },
    Text { id: u64, text: String },
    Alert { id: u64, text: String, kind: AlertKind },
    UpdateText { id: u64, text: String },
    Progress { id: u64, percent: u8 },
    UpdateProgress { id: u64, percent: u8 },
    ImageGrid { tiles: Vec<ImageTile>, captions: Vec<String> },
    Chart { id: u64, spec: ChartSpec },
    AppendRows { id: u64, rows: Vec<MetricSample> },
}

impl ReportOp {
    /// SSE event name used when the op is streamed to a browser.
    pub fn event_name(&self) -> &'static str {
        match self {
            ReportOp::Header { .. } => "header",
            ReportOp::Text { .. } => "text",
            ReportOp::Alert { .. } => "alert",
            ReportOp::UpdateText { .. } => "update_text",
            ReportOp::Progress { .. } => "progress",
            ReportOp::UpdateProgress { .. } => "update_progress",
            ReportOp::ImageGrid { .. } => "image_grid",
            ReportOp::Chart { .. } => "chart",
            ReportOp::AppendRows { .. } => "append_rows",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ops_are_tagged_by_name() {
        let op = ReportOp::UpdateProgress { id: 7, percent: 42 };
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["op"], "update_progress");
        assert_eq!(json["id"], 7);
        assert_eq!(json["percent"], 42);
        assert_eq!(op.event_name(), "update_progress");
    }

    #[test]
    fn image_pixels_stay_off_the_wire() {
        let op = ReportOp::ImageGrid {
            tiles: vec![ImageTile { id: 3, width: 2, height: 2, pixels: GrayImage::new(2, 2) }],
            captions: vec!["7".to_owned()],
        };
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["tiles"][0], serde_json::json!({ "id": 3, "width": 2, "height": 2 }));
    }
}
