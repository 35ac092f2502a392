use std::collections::HashMap;
use std::sync::mpsc;

use image::GrayImage;

use crate::error::SurfaceError;
use crate::metrics::MetricSample;
use crate::report::chart::{ChartKind, ChartSpec};
use crate::report::op::{ImageTile, ReportOp};
use crate::report::surface::{AlertKind, ChartHandle, ProgressHandle, ReportSurface, TextHandle};

/// Top-level element of a recorded report, in document order.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Header { text: String, level: u8 },
    Text(u64),
    Alert { id: u64, kind: AlertKind },
    Progress(u64),
    Chart { id: u64, kind: ChartKind },
    ImageGrid { tile_ids: Vec<u64>, captions: Vec<String> },
}

/// In-memory `ReportSurface` that keeps both the op log and the current
/// state of every element.
///
/// With a listener attached every op is also forwarded over an `mpsc`
/// channel. A dropped receiver fails the call with
/// `SurfaceError::Disconnected`, which ends the run the same way a closed
/// browser tab does.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    next_id: u64,
    ops: Vec<ReportOp>,
    blocks: Vec<Block>,
    texts: HashMap<u64, String>,
    progress: HashMap<u64, u8>,
    charts: HashMap<u64, Vec<MetricSample>>,
    images: HashMap<u64, GrayImage>,
    listener: Option<mpsc::Sender<ReportOp>>,
    closed: bool,
}

impl RecordingSurface {
    pub fn new() -> Self {
        RecordingSurface::default()
    }

    pub fn with_listener(listener: mpsc::Sender<ReportOp>) -> Self {
        RecordingSurface { listener: Some(listener), ..RecordingSurface::default() }
    }

    /// Rejects every further call with `SurfaceError::Closed`.
    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn ops(&self) -> &[ReportOp] {
        &self.ops
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn text(&self, handle: TextHandle) -> Option<&str> {
        self.texts.get(&handle.0).map(String::as_str)
    }

    pub fn progress(&self, handle: ProgressHandle) -> Option<u8> {
        self.progress.get(&handle.0).copied()
    }

    /// Every row rendered so far on the chart, across all flushes.
    pub fn chart_rows(&self, handle: ChartHandle) -> Option<&[MetricSample]> {
        self.charts.get(&handle.0).map(Vec::as_slice)
    }

    pub fn image(&self, id: u64) -> Option<&GrayImage> {
        self.images.get(&id)
    }

    fn allocate(&mut self) -> Result<u64, SurfaceError> {
        if self.closed {
            return Err(SurfaceError::Closed);
        }
        self.next_id += 1;
        Ok(self.next_id)
    }

    fn ensure_open(&self) -> Result<(), SurfaceError> {
        if self.closed {
            Err(SurfaceError::Closed)
        } else {
            Ok(())
        }
    }

    fn emit(&mut self, op: ReportOp) -> Result<(), SurfaceError> {
        if let Some(ref tx) = self.listener {
            tx.send(op.clone()).map_err(|_| SurfaceError::Disconnected)?;
        }
        self.ops.push(op);
        Ok(())
    }
}

impl ReportSurface for RecordingSurface {
    fn render_header(&mut self, text: &str, level: u8) -> Result<(), SurfaceError> {
        self.ensure_open()?;
        self.emit(ReportOp::Header { text: text.to_owned(), level })?;
        self.blocks.push(Block::Header { text: text.to_owned(), level });
        Ok(())
    }

    fn render_text(&mut self, text: &str) -> Result<TextHandle, SurfaceError> {
        let id = self.allocate()?;
        self.emit(ReportOp::Text { id, text: text.to_owned() })?;
        self.texts.insert(id, text.to_owned());
        self.blocks.push(Block::Text(id));
        Ok(TextHandle(id))
    }

    fn render_alert(&mut self, text: &str, kind: AlertKind) -> Result<TextHandle, SurfaceError> {
        let id = self.allocate()?;
        self.emit(ReportOp::Alert { id, text: text.to_owned(), kind })?;
        self.texts.insert(id, text.to_owned());
        self.blocks.push(Block::Alert { id, kind });
        Ok(TextHandle(id))
    }

    fn update_text(&mut self, handle: TextHandle, text: &str) -> Result<(), SurfaceError> {
        self.ensure_open()?;
        if !self.texts.contains_key(&handle.0) {
            return Err(SurfaceError::UnknownElement(handle.0));
        }
        self.emit(ReportOp::UpdateText { id: handle.0, text: text.to_owned() })?;
        self.texts.insert(handle.0, text.to_owned());
        Ok(())
    }

    fn render_progress(&mut self, percent: u8) -> Result<ProgressHandle, SurfaceError> {
        let id = self.allocate()?;
        self.emit(ReportOp::Progress { id, percent })?;
        self.progress.insert(id, percent);
        self.blocks.push(Block::Progress(id));
        Ok(ProgressHandle(id))
    }

    fn update_progress(&mut self, handle: ProgressHandle, percent: u8) -> Result<(), SurfaceError> {
        self.ensure_open()?;
        if !self.progress.contains_key(&handle.0) {
            return Err(SurfaceError::UnknownElement(handle.0));
        }
        self.emit(ReportOp::UpdateProgress { id: handle.0, percent })?;
        self.progress.insert(handle.0, percent);
        Ok(())
    }

    fn render_image_grid(&mut self, images: &[GrayImage], captions: &[String]) -> Result<(), SurfaceError> {
        self.ensure_open()?;
        let mut tiles = Vec::with_capacity(images.len());
        for img in images {
            let id = self.allocate()?;
            tiles.push(ImageTile {
                id,
                width: img.width(),
                height: img.height(),
                pixels: img.clone(),
            });
        }
        let tile_ids: Vec<u64> = tiles.iter().map(|t| t.id).collect();
        let stored: Vec<(u64, GrayImage)> = tiles.iter().map(|t| (t.id, t.pixels.clone())).collect();

        self.emit(ReportOp::ImageGrid { tiles, captions: captions.to_vec() })?;
        self.images.extend(stored);
        self.blocks.push(Block::ImageGrid { tile_ids, captions: captions.to_vec() });
        Ok(())
    }

    fn render_chart(&mut self, spec: &ChartSpec) -> Result<ChartHandle, SurfaceError> {
        let id = self.allocate()?;
        self.emit(ReportOp::Chart { id, spec: spec.clone() })?;
        self.charts.insert(id, Vec::new());
        self.blocks.push(Block::Chart { id, kind: spec.kind });
        Ok(ChartHandle(id))
    }

    fn append_rows(&mut self, handle: ChartHandle, rows: &[MetricSample]) -> Result<(), SurfaceError> {
        self.ensure_open()?;
        if !self.charts.contains_key(&handle.0) {
            return Err(SurfaceError::UnknownElement(handle.0));
        }
        self.emit(ReportOp::AppendRows { id: handle.0, rows: rows.to_vec() })?;
        if let Some(series) = self.charts.get_mut(&handle.0) {
            series.extend_from_slice(rows);
        }
        Ok(())
    }
}
