use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::{ReportError, Result};
use crate::metrics::{EpochContext, MetricSample, completion_percent, LOSS, ACCURACY};
use crate::report::{AlertKind, ChartKind, ChartSpec, ReportSurface, TextHandle};
use crate::telemetry::chart_buffer::{ChartBuffer, FlushPolicy};
use crate::telemetry::config::StreamerConfig;
use crate::telemetry::format;
use crate::telemetry::progress_sink::ProgressSink;
use crate::telemetry::sampling::{inverted_tile, sample_indices};
use crate::train::callback::TrainingCallback;
use crate::train::eval_set::EvalSet;
use crate::train::learner::Classifier;

/// Widgets that live for the whole run.
#[derive(Debug)]
struct RunState {
    summary_chart: ChartBuffer,
    epoch_counter: TextHandle,
    global_batch_count: u64,
    last_epoch: Option<usize>,
}

/// Widgets of the epoch currently open. Replaced wholesale by every
/// `on_epoch_begin`; the previous epoch's widgets are never touched again.
#[derive(Debug)]
struct EpochState {
    context: EpochContext,
    chart: ChartBuffer,
    progress: ProgressSink,
    latest_summary: TextHandle,
}

/// Turns training lifecycle events into an incrementally updated report.
///
/// Layout produced on the surface:
///
/// ```text
/// ## Summary          area chart of the whole run + epoch counter
/// ## Training Log
/// ### Epoch 0         line chart, progress bar, latest-batch stats
/// ##### Summary       example predictions + epoch metrics
/// ### Epoch 1
/// ...
/// ```
///
/// The streamer only reacts to calls; it never renders on its own. Every
/// entry point validates its input before the first render, so a rejected
/// call leaves no partial output behind.
pub struct TelemetryStreamer<S: ReportSurface> {
    surface: S,
    eval_set: EvalSet,
    config: StreamerConfig,
    rng: StdRng,
    run: Option<RunState>,
    epoch: Option<EpochState>,
}

impl<S: ReportSurface> TelemetryStreamer<S> {
    pub fn new(surface: S, eval_set: EvalSet, config: StreamerConfig) -> Result<Self> {
        config.validate()?;
        let rng = match config.sample_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(TelemetryStreamer { surface, eval_set, config, rng, run: None, epoch: None })
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    pub fn config(&self) -> &StreamerConfig {
        &self.config
    }

    /// Batches observed since `on_train_begin`, across all epochs.
    pub fn global_batch_count(&self) -> u64 {
        self.run.as_ref().map(|r| r.global_batch_count).unwrap_or(0)
    }

    pub fn on_train_begin(&mut self) -> Result<()> {
        if self.run.is_some() {
            return Err(ReportError::contract("on_train_begin called twice"));
        }

        self.surface.render_header("Summary", 2)?;
        let spec = ChartSpec::loss_accuracy(ChartKind::Area, self.config.summary_chart_height);
        let summary_chart = ChartBuffer::open(
            &mut self.surface,
            &spec,
            FlushPolicy::trailing(self.config.summary_flush_stride),
        )?;
        let epoch_counter = self.surface.render_text(&format::initial_counter())?;
        self.surface.render_header("Training Log", 2)?;

        self.run = Some(RunState {
            summary_chart,
            epoch_counter,
            global_batch_count: 0,
            last_epoch: None,
        });
        info!("telemetry stream started");
        Ok(())
    }

    pub fn on_epoch_begin(&mut self, epoch_index: usize) -> Result<()> {
        let run = self
            .run
            .as_mut()
            .ok_or_else(|| ReportError::contract("on_epoch_begin before on_train_begin"))?;
        if let Some(open) = &self.epoch {
            return Err(ReportError::contract(format!(
                "on_epoch_begin({}) while epoch {} is still open",
                epoch_index, open.context.epoch_index
            )));
        }
        if let Some(last) = run.last_epoch {
            if epoch_index <= last {
                return Err(ReportError::contract(format!(
                    "epoch {} does not follow epoch {}",
                    epoch_index, last
                )));
            }
        }

        self.surface.render_header(&format!("Epoch {}", epoch_index), 3)?;
        let spec = ChartSpec::loss_accuracy(ChartKind::Line, self.config.epoch_chart_height);
        let chart = ChartBuffer::open(
            &mut self.surface,
            &spec,
            FlushPolicy::leading(self.config.epoch_flush_stride),
        )?;
        let progress = ProgressSink::open(&mut self.surface)?;
        let latest_summary = self.surface.render_alert("No stats yet.", AlertKind::Info)?;

        run.last_epoch = Some(epoch_index);
        self.epoch = Some(EpochState {
            context: EpochContext::new(epoch_index),
            chart,
            progress,
            latest_summary,
        });
        info!("epoch {} started", epoch_index);
        Ok(())
    }

    pub fn on_batch_end(
        &mut self,
        batch_index: usize,
        sample: &MetricSample,
        batch_size: usize,
        total_samples: usize,
    ) -> Result<()> {
        let run = self
            .run
            .as_mut()
            .ok_or_else(|| ReportError::contract("on_batch_end before on_train_begin"))?;
        let epoch = self
            .epoch
            .as_mut()
            .ok_or_else(|| ReportError::contract("on_batch_end outside of an epoch"))?;

        sample.require(LOSS)?;
        sample.require(ACCURACY)?;
        let summary_line = format::batch_summary(sample)?;
        let completion = completion_percent(batch_index, batch_size, total_samples)?;

        // Counted before rendering so a failed render cannot shift later
        // summary flush points.
        let global_index = run.global_batch_count;
        run.global_batch_count += 1;
        epoch.context.observe_batch(batch_index, batch_size, total_samples)?;

        epoch.chart.push(&mut self.surface, batch_index as u64, sample)?;
        run.summary_chart.push(&mut self.surface, global_index, sample)?;
        epoch.progress.update(&mut self.surface, completion)?;
        self.surface.update_text(epoch.latest_summary, &summary_line)?;

        trace!(
            "epoch {} batch {} ({}%): {}",
            epoch.context.epoch_index, batch_index, completion, summary_line
        );
        Ok(())
    }

    pub fn on_epoch_end(&mut self, epoch_index: usize, sample: &MetricSample, model: &dyn Classifier) -> Result<()> {
        let run = self
            .run
            .as_mut()
            .ok_or_else(|| ReportError::contract("on_epoch_end before on_train_begin"))?;
        match &self.epoch {
            Some(open) if open.context.epoch_index == epoch_index => {}
            Some(open) => {
                return Err(ReportError::contract(format!(
                    "on_epoch_end({}) while epoch {} is open",
                    epoch_index, open.context.epoch_index
                )))
            }
            None => {
                return Err(ReportError::contract(format!(
                    "on_epoch_end({}) without a matching on_epoch_begin",
                    epoch_index
                )))
            }
        }
        sample.require(LOSS)?;
        sample.require(ACCURACY)?;
        let indices = sample_indices(&mut self.rng, self.eval_set.len(), self.config.example_count)?;

        // The epoch is over from here on, whatever happens while rendering.
        let finished = self.epoch.take();

        self.surface.render_header("Summary", 5)?;

        let mut tiles = Vec::with_capacity(indices.len());
        let mut captions = Vec::with_capacity(indices.len());
        for &i in &indices {
            let pixels = self
                .eval_set
                .get(i)
                .ok_or_else(|| ReportError::contract(format!("evaluation index {} out of range", i)))?;
            tiles.push(inverted_tile(pixels, self.eval_set.width(), self.eval_set.height()));
            captions.push(model.predict_class(pixels).to_string());
        }
        self.surface.render_image_grid(&tiles, &captions)?;

        let dump = format::metric_dump(sample);
        self.surface.render_text(&dump)?;
        self.surface
            .update_text(run.epoch_counter, &format::epoch_counter(epoch_index, &dump))?;

        if let Some(state) = finished {
            debug!(
                "epoch {} closed after {} batch(es), {} row(s) left unflushed",
                epoch_index,
                state.context.batches_seen,
                state.chart.pending()
            );
        }
        info!("epoch {} finished: {}", epoch_index, dump.replace('\n', ","));
        Ok(())
    }
}

impl<S: ReportSurface> TrainingCallback for TelemetryStreamer<S> {
    fn on_train_begin(&mut self) -> Result<()> {
        TelemetryStreamer::on_train_begin(self)
    }

    fn on_epoch_begin(&mut self, epoch: usize) -> Result<()> {
        TelemetryStreamer::on_epoch_begin(self, epoch)
    }

    fn on_batch_end(
        &mut self,
        batch: usize,
        metrics: &MetricSample,
        batch_size: usize,
        total_samples: usize,
    ) -> Result<()> {
        TelemetryStreamer::on_batch_end(self, batch, metrics, batch_size, total_samples)
    }

    fn on_epoch_end(&mut self, epoch: usize, metrics: &MetricSample, model: &dyn Classifier) -> Result<()> {
        TelemetryStreamer::on_epoch_end(self, epoch, metrics, model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{Block, RecordingSurface, ReportOp};

    struct Constant(usize);

    impl Classifier for Constant {
        fn predict_class(&self, _input: &[f32]) -> usize {
            self.0
        }
    }

    fn eval_set(n: usize) -> EvalSet {
        EvalSet::new(2, 2, (0..n).map(|i| vec![i as f32 / n as f32; 4]).collect()).unwrap()
    }

    fn streamer(n_eval: usize) -> TelemetryStreamer<RecordingSurface> {
        let config = StreamerConfig { sample_seed: Some(42), ..StreamerConfig::default() };
        TelemetryStreamer::new(RecordingSurface::new(), eval_set(n_eval), config).unwrap()
    }

    fn batch(i: usize) -> MetricSample {
        MetricSample::loss_accuracy(1.0 / (i + 1) as f64, 0.5)
    }

    #[test]
    fn train_begin_lays_out_the_summary_section() {
        let mut s = streamer(36);
        s.on_train_begin().unwrap();
        let blocks = s.surface().blocks();
        assert_eq!(blocks[0], Block::Header { text: "Summary".into(), level: 2 });
        assert!(matches!(blocks[1], Block::Chart { kind: ChartKind::Area, .. }));
        match blocks[2] {
            Block::Text(id) => assert_eq!(s.surface().text(TextHandle(id)), Some("   epoch :  0")),
            ref other => panic!("unexpected block {:?}", other),
        }
        assert_eq!(blocks[3], Block::Header { text: "Training Log".into(), level: 2 });
    }

    #[test]
    fn epoch_begin_allocates_four_widgets() {
        let mut s = streamer(36);
        s.on_train_begin().unwrap();
        let before = s.surface().blocks().len();
        s.on_epoch_begin(0).unwrap();
        let added = &s.surface().blocks()[before..];
        assert_eq!(added.len(), 4);
        assert_eq!(added[0], Block::Header { text: "Epoch 0".into(), level: 3 });
        assert!(matches!(added[1], Block::Chart { kind: ChartKind::Line, .. }));
        assert!(matches!(added[2], Block::Progress(_)));
        assert!(matches!(added[3], Block::Alert { kind: AlertKind::Info, .. }));
    }

    #[test]
    fn batch_end_overwrites_the_latest_summary() {
        let mut s = streamer(36);
        s.on_train_begin().unwrap();
        s.on_epoch_begin(0).unwrap();
        s.on_batch_end(0, &batch(0), 32, 3840).unwrap();
        s.on_batch_end(1, &MetricSample::loss_accuracy(0.25, 0.75), 32, 3840).unwrap();

        let alert = s
            .surface()
            .blocks()
            .iter()
            .find_map(|b| match b {
                Block::Alert { id, .. } => Some(TextHandle(*id)),
                _ => None,
            })
            .unwrap();
        assert_eq!(s.surface().text(alert), Some("loss: 0.25000 | acc: 0.75000"));
        assert_eq!(s.global_batch_count(), 2);
    }

    #[test]
    fn missing_loss_is_fatal_and_renders_nothing() {
        let mut s = streamer(36);
        s.on_train_begin().unwrap();
        s.on_epoch_begin(0).unwrap();
        let ops_before = s.surface().ops().len();
        let err = s
            .on_batch_end(0, &MetricSample::new().with(ACCURACY, 0.5), 32, 100)
            .unwrap_err();
        assert!(matches!(err, ReportError::MissingMetric(ref k) if k == "loss"));
        assert_eq!(s.surface().ops().len(), ops_before);
        assert_eq!(s.global_batch_count(), 0);
    }

    #[test]
    fn out_of_order_calls_are_rejected() {
        let mut s = streamer(36);
        assert!(matches!(s.on_epoch_begin(0), Err(ReportError::Contract(_))));
        s.on_train_begin().unwrap();
        assert!(matches!(s.on_train_begin(), Err(ReportError::Contract(_))));
        assert!(matches!(s.on_batch_end(0, &batch(0), 1, 1), Err(ReportError::Contract(_))));
        s.on_epoch_begin(1).unwrap();
        assert!(matches!(s.on_epoch_begin(2), Err(ReportError::Contract(_))));
        assert!(matches!(
            s.on_epoch_end(0, &batch(0), &Constant(0)),
            Err(ReportError::Contract(_))
        ));
        s.on_epoch_end(1, &batch(0), &Constant(0)).unwrap();
        assert!(matches!(s.on_epoch_begin(1), Err(ReportError::Contract(_))));
        s.on_epoch_begin(3).unwrap();
    }

    #[test]
    fn epoch_end_renders_grid_dump_and_counter() {
        let mut s = streamer(40);
        s.on_train_begin().unwrap();
        s.on_epoch_begin(0).unwrap();
        s.on_batch_end(0, &batch(0), 10, 10).unwrap();
        let epoch_metrics = MetricSample::loss_accuracy(0.5, 0.9).with("val_loss", 0.6);
        s.on_epoch_end(0, &epoch_metrics, &Constant(7)).unwrap();

        let blocks = s.surface().blocks();
        let n = blocks.len();
        assert_eq!(blocks[n - 3], Block::Header { text: "Summary".into(), level: 5 });
        match &blocks[n - 2] {
            Block::ImageGrid { tile_ids, captions } => {
                assert_eq!(tile_ids.len(), 36);
                assert!(captions.iter().all(|c| c == "7"));
            }
            other => panic!("unexpected block {:?}", other),
        }
        let dump = "    loss :  0.50000\naccuracy :  0.90000\nval_loss :  0.60000";
        match blocks[n - 1] {
            Block::Text(id) => assert_eq!(s.surface().text(TextHandle(id)), Some(dump)),
            ref other => panic!("unexpected block {:?}", other),
        }
        match blocks[2] {
            Block::Text(id) => assert_eq!(
                s.surface().text(TextHandle(id)),
                Some(format!("   epoch :  0\n{}", dump).as_str())
            ),
            ref other => panic!("unexpected block {:?}", other),
        }
    }

    #[test]
    fn example_tiles_are_inverted() {
        let mut s = streamer(36);
        s.on_train_begin().unwrap();
        s.on_epoch_begin(0).unwrap();
        s.on_epoch_end(0, &batch(0), &Constant(1)).unwrap();
        let grid = s.surface().ops().iter().find_map(|op| match op {
            ReportOp::ImageGrid { tiles, .. } => Some(tiles.clone()),
            _ => None,
        });
        let tiles = grid.unwrap();
        // Image 0 is all zeros, which inverts to white.
        let whites = tiles.iter().filter(|t| t.pixels.get_pixel(0, 0).0[0] == 255).count();
        assert_eq!(whites, 1);
    }

    #[test]
    fn too_small_eval_set_fails_before_rendering() {
        let mut s = streamer(10);
        s.on_train_begin().unwrap();
        s.on_epoch_begin(0).unwrap();
        let ops_before = s.surface().ops().len();
        assert!(matches!(
            s.on_epoch_end(0, &batch(0), &Constant(0)),
            Err(ReportError::EvalSetTooSmall { required: 36, available: 10 })
        ));
        assert_eq!(s.surface().ops().len(), ops_before);
    }
}
