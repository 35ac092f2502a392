use serde::{Serialize, Deserialize};

use crate::metrics::{LOSS, ACCURACY};

/// Which kind of cartesian chart to draw.
///
/// - `Line`: per-epoch charts
/// - `Area`: the long-lived run summary chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    Area,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisOrientation {
    Left,
    Right,
}

/// A numeric y-axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisSpec {
    pub id: String,
    pub orientation: AxisOrientation,
    pub allow_data_overflow: bool,
}

/// One plotted series bound to a y-axis by `axis_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSpec {
    /// Metric key read from every appended row.
    pub data_key: String,
    pub axis_id: String,
    pub stroke: String,
    pub fill: String,
    /// Interpolation, e.g. `"monotone"`.
    pub curve: String,
    pub dot: bool,
}

/// Everything the surface needs to draw an (initially empty) chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    /// Pixel height; `0` lets the surface pick.
    pub height: u32,
    pub axes: Vec<AxisSpec>,
    pub series: Vec<SeriesSpec>,
    pub grid_dasharray: String,
    pub legend: bool,
}

const LOSS_AXIS: &str = "loss_axis";
const ACC_AXIS: &str = "acc_axis";
const LOSS_COLOR: &str = "rgb(44,125,246)";
const ACC_COLOR: &str = "#82ca9d";

impl ChartSpec {
    /// Two-axis chart: loss on the left axis, accuracy on the right one.
    /// Both kinds share the same configuration; only the drawing primitive
    /// differs.
    pub fn loss_accuracy(kind: ChartKind, height: u32) -> Self {
        let axis = |id: &str, orientation| AxisSpec {
            id: id.to_owned(),
            orientation,
            allow_data_overflow: true,
        };
        let series = |key: &str, axis_id: &str, color: &str| SeriesSpec {
            data_key: key.to_owned(),
            axis_id: axis_id.to_owned(),
            stroke: color.to_owned(),
            fill: color.to_owned(),
            curve: "monotone".to_owned(),
            dot: false,
        };

        ChartSpec {
            kind,
            height,
            axes: vec![
                axis(LOSS_AXIS, AxisOrientation::Left),
                axis(ACC_AXIS, AxisOrientation::Right),
            ],
            series: vec![
                series(LOSS, LOSS_AXIS, LOSS_COLOR),
                series(ACCURACY, ACC_AXIS, ACC_COLOR),
            ],
            grid_dasharray: "3 3".to_owned(),
            legend: true,
        }
    }

    /// Metric keys each appended row must carry.
    pub fn data_keys(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(|s| s.data_key.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_map_to_their_own_axes() {
        let spec = ChartSpec::loss_accuracy(ChartKind::Line, 0);
        assert_eq!(spec.data_keys().collect::<Vec<_>>(), vec!["loss", "accuracy"]);
        assert_eq!(spec.series[0].axis_id, "loss_axis");
        assert_eq!(spec.series[1].axis_id, "acc_axis");
        assert_eq!(spec.axes[1].orientation, AxisOrientation::Right);
        assert!(spec.series.iter().all(|s| !s.dot && s.curve == "monotone"));
    }

    #[test]
    fn kind_only_changes_the_primitive() {
        let line = ChartSpec::loss_accuracy(ChartKind::Line, 300);
        let area = ChartSpec::loss_accuracy(ChartKind::Area, 300);
        assert_eq!(line.series, area.series);
        assert_eq!(line.axes, area.axes);
        assert_ne!(line.kind, area.kind);
    }

    #[test]
    fn kind_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&ChartKind::Area).unwrap(), "\"area\"");
    }
}
