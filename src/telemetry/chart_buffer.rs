use log::debug;

use crate::error::Result;
use crate::metrics::MetricSample;
use crate::report::{ChartHandle, ChartSpec, ReportSurface};

/// When a buffered chart transmits its pending rows.
///
/// A flush fires on the event whose index satisfies `index % stride == phase`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushPolicy {
    stride: usize,
    phase: usize,
}

impl FlushPolicy {
    /// Flushes on indices `0, stride, 2*stride, ...`.
    pub fn leading(stride: usize) -> Self {
        FlushPolicy { stride: stride.max(1), phase: 0 }
    }

    /// Flushes on indices `stride-1, 2*stride-1, ...` (the first flush waits
    /// for a full stride).
    pub fn trailing(stride: usize) -> Self {
        let stride = stride.max(1);
        FlushPolicy { stride, phase: stride - 1 }
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn should_flush(&self, index: u64) -> bool {
        index % self.stride as u64 == self.phase as u64
    }
}

/// Append-only series bound to one rendered chart.
///
/// Rows accumulate locally and reach the surface in a single `append_rows`
/// call when the flush policy fires, so every flush carries all rows received
/// since the previous one.
#[derive(Debug)]
pub struct ChartBuffer {
    handle: ChartHandle,
    keys: Vec<String>,
    pending: Vec<MetricSample>,
    policy: FlushPolicy,
    flushes: usize,
    rows_flushed: usize,
}

impl ChartBuffer {
    /// Renders an empty chart and binds a new buffer to it.
    pub fn open<S: ReportSurface>(surface: &mut S, spec: &ChartSpec, policy: FlushPolicy) -> Result<Self> {
        let handle = surface.render_chart(spec)?;
        Ok(ChartBuffer {
            handle,
            keys: spec.data_keys().map(str::to_owned).collect(),
            pending: Vec::new(),
            policy,
            flushes: 0,
            rows_flushed: 0,
        })
    }

    /// Buffers `sample` as the row for event `index` and flushes if the
    /// policy says so. Returns whether a flush happened.
    ///
    /// A sample lacking one of the chart's series keys is rejected before it
    /// is buffered.
    pub fn push<S: ReportSurface>(&mut self, surface: &mut S, index: u64, sample: &MetricSample) -> Result<bool> {
        for key in &self.keys {
            sample.require(key)?;
        }
        self.pending.push(sample.clone());
        if self.policy.should_flush(index) {
            self.flush(surface)?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Sends every pending row to the surface.
    ///
    /// Rows leave the buffer only once the surface accepted them.
    pub fn flush<S: ReportSurface>(&mut self, surface: &mut S) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        surface.append_rows(self.handle, &self.pending)?;
        debug!(
            "chart #{} flushed {} row(s) (flush {})",
            self.handle.0,
            self.pending.len(),
            self.flushes + 1
        );
        self.rows_flushed += self.pending.len();
        self.flushes += 1;
        self.pending.clear();
        Ok(())
    }

    pub fn handle(&self) -> ChartHandle {
        self.handle
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn flushes(&self) -> usize {
        self.flushes
    }

    pub fn rows_flushed(&self) -> usize {
        self.rows_flushed
    }

    pub fn policy(&self) -> FlushPolicy {
        self.policy
    }
}
