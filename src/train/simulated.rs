use std::cell::Cell;
use std::ops::Range;
use std::thread;
use std::time::Duration;

use rand::prelude::*;
use rand::rngs::StdRng;

use crate::error::Result;
use crate::metrics::MetricSample;
use crate::train::eval_set::EvalSet;
use crate::train::learner::{Classifier, Learner};

const GLYPH_SIDE: u32 = 28;
const STROKE_TOP: u32 = 4;
const STROKE_BOTTOM: u32 = 24;

/// Column where the stroke for `class` starts; every class owns two columns.
fn stroke_column(class: usize) -> u32 {
    3 + 2 * class as u32
}

/// Builds `count` synthetic 28x28 glyphs for `classes` classes.
///
/// Each glyph is a bright two-pixel vertical stroke whose column encodes the
/// class, over faint background noise. `SimulatedLearner` reads the class
/// back from the stroke position.
pub fn synthetic_glyphs(count: usize, classes: usize, seed: u64) -> Result<EvalSet> {
    let classes = classes.clamp(2, 10);
    let mut rng = StdRng::seed_from_u64(seed);
    let images = (0..count)
        .map(|_| {
            let class = rng.gen_range(0..classes);
            let col = stroke_column(class);
            (0..GLYPH_SIDE * GLYPH_SIDE)
                .map(|p| {
                    let (x, y) = (p % GLYPH_SIDE, p / GLYPH_SIDE);
                    let on_stroke = (x == col || x == col + 1) && (STROKE_TOP..STROKE_BOTTOM).contains(&y);
                    if on_stroke {
                        rng.gen_range(0.8..=1.0)
                    } else {
                        rng.gen_range(0.0..0.15)
                    }
                })
                .collect()
        })
        .collect();
    EvalSet::new(GLYPH_SIDE, GLYPH_SIDE, images)
}

/// Stand-in for a real model: reports plausible, noisy metric curves and
/// classifies the glyphs from `synthetic_glyphs` with a success rate that
/// tracks its simulated accuracy.
///
/// Useful for exercising the telemetry pipeline without a training backend.
/// Everything random, prediction mistakes included, derives from `seed`, so
/// two learners with the same seed fed the same calls behave identically.
pub struct SimulatedLearner {
    samples: usize,
    classes: usize,
    seed: u64,
    rng: StdRng,
    /// Number of `predict_class` calls so far; seeds each prediction.
    predictions: Cell<u64>,
    step: u64,
    /// Steps after which the loss gap has shrunk by `e`.
    decay_steps: f64,
    accuracy: f64,
    epoch_loss: f64,
    epoch_acc: f64,
    epoch_batches: usize,
    batch_delay: Option<Duration>,
}

impl SimulatedLearner {
    pub fn new(samples: usize, classes: usize, seed: u64) -> Self {
        SimulatedLearner {
            samples,
            classes: classes.clamp(2, 10),
            seed,
            rng: StdRng::seed_from_u64(seed),
            predictions: Cell::new(0),
            step: 0,
            decay_steps: 150.0,
            accuracy: 1.0 / classes.clamp(2, 10) as f64,
            epoch_loss: 0.0,
            epoch_acc: 0.0,
            epoch_batches: 0,
            batch_delay: None,
        }
    }

    /// Sleeps this long in every `train_batch`, so a live report has time to
    /// animate.
    pub fn with_batch_delay(mut self, delay: Duration) -> Self {
        self.batch_delay = Some(delay).filter(|d| !d.is_zero());
        self
    }

    pub fn with_decay_steps(mut self, steps: f64) -> Self {
        self.decay_steps = steps.max(1.0);
        self
    }

    /// Current simulated accuracy in `[0, 1]`.
    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    fn curves(&mut self) -> (f64, f64) {
        let chance = 1.0 / self.classes as f64;
        let t = (-(self.step as f64) / self.decay_steps).exp();
        let loss = (self.classes as f64).ln() * t + 0.05 + self.rng.gen_range(-0.04..0.04) * (0.3 + t);
        let acc = 0.98 - (0.98 - chance) * t + self.rng.gen_range(-0.03..0.03);
        (loss.max(0.0), acc.clamp(0.0, 1.0))
    }
}

impl Classifier for SimulatedLearner {
    fn predict_class(&self, input: &[f32]) -> usize {
        let mut column_mass = vec![0.0f32; GLYPH_SIDE as usize];
        for (p, v) in input.iter().enumerate() {
            column_mass[p % GLYPH_SIDE as usize] += v;
        }
        let brightest = column_mass
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(i, _)| i as u32)
            .unwrap_or(0);
        let decoded = (brightest.saturating_sub(3) / 2) as usize;
        let truth = decoded.min(self.classes - 1);

        let call = self.predictions.get();
        self.predictions.set(call + 1);
        let mut rng = StdRng::seed_from_u64(self.seed ^ call.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        if rng.gen_bool(self.accuracy.clamp(0.0, 1.0)) {
            truth
        } else {
            (truth + rng.gen_range(1..self.classes)) % self.classes
        }
    }
}

impl Learner for SimulatedLearner {
    fn train_samples(&self) -> usize {
        self.samples
    }

    fn train_batch(&mut self, _epoch: usize, _batch: usize, _samples: Range<usize>) -> Result<MetricSample> {
        if let Some(delay) = self.batch_delay {
            thread::sleep(delay);
        }
        self.step += 1;
        let (loss, acc) = self.curves();
        self.accuracy = acc;
        self.epoch_loss += loss;
        self.epoch_acc += acc;
        self.epoch_batches += 1;
        Ok(MetricSample::loss_accuracy(loss, acc))
    }

    fn end_epoch(&mut self, _epoch: usize) -> Result<MetricSample> {
        let n = self.epoch_batches.max(1) as f64;
        let (loss, acc) = (self.epoch_loss / n, self.epoch_acc / n);
        self.epoch_loss = 0.0;
        self.epoch_acc = 0.0;
        self.epoch_batches = 0;

        let (val_loss, val_acc) = self.curves();
        Ok(MetricSample::loss_accuracy(loss, acc)
            .with("val_loss", val_loss)
            .with("val_accuracy", val_acc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyphs_have_the_requested_shape() {
        let set = synthetic_glyphs(50, 10, 3).unwrap();
        assert_eq!(set.len(), 50);
        assert_eq!(set.get(0).map(|img| img.len()), Some(784));
    }

    #[test]
    fn a_perfect_learner_reads_the_stroke() {
        let mut learner = SimulatedLearner::new(100, 10, 1);
        learner.accuracy = 1.0;
        for class in 0..10 {
            let col = stroke_column(class);
            let img: Vec<f32> = (0..784u32)
                .map(|p| if p % 28 == col || p % 28 == col + 1 { 1.0 } else { 0.0 })
                .collect();
            assert_eq!(learner.predict_class(&img), class);
        }
    }

    #[test]
    fn predictions_repeat_for_the_same_seed() {
        let glyphs = synthetic_glyphs(64, 10, 5).unwrap();
        let predict_all = |seed| {
            let mut learner = SimulatedLearner::new(100, 10, seed);
            learner.accuracy = 0.5;
            (0..glyphs.len())
                .filter_map(|i| glyphs.get(i))
                .map(|img| learner.predict_class(img))
                .collect::<Vec<_>>()
        };
        assert_eq!(predict_all(21), predict_all(21));
        assert_ne!(predict_all(21), predict_all(22));
    }

    #[test]
    fn loss_trends_down_and_accuracy_up() {
        let mut learner = SimulatedLearner::new(100, 10, 9).with_decay_steps(50.0);
        let first = learner.train_batch(0, 0, 0..1).unwrap();
        for b in 1..400 {
            learner.train_batch(0, b, 0..1).unwrap();
        }
        let last = learner.train_batch(0, 400, 0..1).unwrap();
        assert!(last.get("loss").unwrap() < first.get("loss").unwrap());
        assert!(last.get("accuracy").unwrap() > first.get("accuracy").unwrap());
    }

    #[test]
    fn epoch_metrics_include_validation() {
        let mut learner = SimulatedLearner::new(10, 10, 2);
        learner.train_batch(0, 0, 0..10).unwrap();
        let m = learner.end_epoch(0).unwrap();
        let keys: Vec<&str> = m.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["loss", "accuracy", "val_loss", "val_accuracy"]);
    }
}
