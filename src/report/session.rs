use log::info;

use crate::error::Result;
use crate::report::surface::{AlertKind, ReportSurface};

/// Owns the lifecycle of a report: a title header on open and a closing
/// alert when the run is over.
///
/// The session only brackets the report; everything in between is written by
/// whoever borrows the surface through `surface_mut` (normally a
/// `TelemetryStreamer`).
pub struct ReportSession<S: ReportSurface> {
    surface: S,
    title: String,
}

impl<S: ReportSurface> ReportSession<S> {
    pub fn open(mut surface: S, title: &str) -> Result<Self> {
        surface.render_header(title, 1)?;
        info!("report '{}' opened", title);
        Ok(ReportSession { surface, title: title.to_owned() })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Marks the run as finished and hands the surface back.
    pub fn close(mut self) -> Result<S> {
        self.surface.render_alert("Finished training!", AlertKind::Success)?;
        info!("report '{}' closed", self.title);
        Ok(self.surface)
    }

    /// Closes the report after an aborted run, recording why it stopped.
    pub fn abort(mut self, reason: &str) -> Result<S> {
        self.surface.render_alert(&format!("Training aborted: {}", reason), AlertKind::Error)?;
        info!("report '{}' aborted: {}", self.title, reason);
        Ok(self.surface)
    }
}
