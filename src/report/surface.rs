use image::GrayImage;
use serde::{Serialize, Deserialize};

use crate::error::SurfaceError;
use crate::metrics::MetricSample;
use crate::report::chart::ChartSpec;

/// Handle to a rendered text or alert element that can later be overwritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TextHandle(pub u64);

/// Handle to a rendered progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ProgressHandle(pub u64);

/// Handle to a rendered chart that accepts appended rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ChartHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Info,
    Success,
    Warning,
    Error,
}

/// The output surface a report is written to.
///
/// Every call appends to the report or updates an element previously created
/// through this surface. Calls are applied in the order they are made; the
/// surface never reorders or coalesces them.
pub trait ReportSurface {
    fn render_header(&mut self, text: &str, level: u8) -> Result<(), SurfaceError>;

    fn render_text(&mut self, text: &str) -> Result<TextHandle, SurfaceError>;

    fn render_alert(&mut self, text: &str, kind: AlertKind) -> Result<TextHandle, SurfaceError>;

    /// Replaces the content of a text or alert element.
    fn update_text(&mut self, handle: TextHandle, text: &str) -> Result<(), SurfaceError>;

    fn render_progress(&mut self, percent: u8) -> Result<ProgressHandle, SurfaceError>;

    fn update_progress(&mut self, handle: ProgressHandle, percent: u8) -> Result<(), SurfaceError>;

    /// `captions[i]` labels `images[i]`.
    fn render_image_grid(&mut self, images: &[GrayImage], captions: &[String]) -> Result<(), SurfaceError>;

    fn render_chart(&mut self, spec: &ChartSpec) -> Result<ChartHandle, SurfaceError>;

    fn append_rows(&mut self, handle: ChartHandle, rows: &[MetricSample]) -> Result<(), SurfaceError>;
}

impl<S: ReportSurface + ?Sized> ReportSurface for &mut S {
    fn render_header(&mut self, text: &str, level: u8) -> Result<(), SurfaceError> {
        (**self).render_header(text, level)
    }

    fn render_text(&mut self, text: &str) -> Result<TextHandle, SurfaceError> {
        (**self).render_text(text)
    }

    fn render_alert(&mut self, text: &str, kind: AlertKind) -> Result<TextHandle, SurfaceError> {
        (**self).render_alert(text, kind)
    }

    fn update_text(&mut self, handle: TextHandle, text: &str) -> Result<(), SurfaceError> {
        (**self).update_text(handle, text)
    }

    fn render_progress(&mut self, percent: u8) -> Result<ProgressHandle, SurfaceError> {
        (**self).render_progress(percent)
    }

    fn update_progress(&mut self, handle: ProgressHandle, percent: u8) -> Result<(), SurfaceError> {
        (**self).update_progress(handle, percent)
    }

    fn render_image_grid(&mut self, images: &[GrayImage], captions: &[String]) -> Result<(), SurfaceError> {
        (**self).render_image_grid(images, captions)
    }

    fn render_chart(&mut self, spec: &ChartSpec) -> Result<ChartHandle, SurfaceError> {
        (**self).render_chart(spec)
    }

    fn append_rows(&mut self, handle: ChartHandle, rows: &[MetricSample]) -> Result<(), SurfaceError> {
        (**self).append_rows(handle, rows)
    }
}
