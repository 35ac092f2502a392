use log::debug;

use crate::error::Result;
use crate::report::{ProgressHandle, ReportSurface};

/// Progress bar of the epoch being streamed.
///
/// Rendering the bar is the `Uninitialized -> Active(0)` transition; every
/// `update` stays in `Active`. There is no explicit terminal call: the sink
/// is dropped when the next epoch begins, after which its bar is never
/// touched again.
///
/// Monotonicity is expected but not enforced; a value lower than the current
/// one is displayed as given.
#[derive(Debug)]
pub struct ProgressSink {
    handle: ProgressHandle,
    percent: u8,
    updates: usize,
}

impl ProgressSink {
    pub fn open<S: ReportSurface>(surface: &mut S) -> Result<Self> {
        let handle = surface.render_progress(0)?;
        Ok(ProgressSink { handle, percent: 0, updates: 0 })
    }

    pub fn update<S: ReportSurface>(&mut self, surface: &mut S, percent: u8) -> Result<()> {
        let percent = percent.min(100);
        if percent < self.percent {
            debug!(
                "progress #{} moved backwards: {}% -> {}%",
                self.handle.0, self.percent, percent
            );
        }
        surface.update_progress(self.handle, percent)?;
        self.percent = percent;
        self.updates += 1;
        Ok(())
    }

    pub fn handle(&self) -> ProgressHandle {
        self.handle
    }

    pub fn percent(&self) -> u8 {
        self.percent
    }

    pub fn updates(&self) -> usize {
        self.updates
    }
}
