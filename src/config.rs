use serde::{Serialize, Deserialize};

use crate::error::Result;
use crate::telemetry::StreamerConfig;

/// Everything needed to stream one simulated training run into a report.
///
/// All fields have defaults, so a JSON file only needs to name what it
/// changes. The defaults mirror the classic MNIST setup: 5 epochs over
/// 60 000 samples in batches of 32, with a 10 000 image evaluation set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Title of the report (level-1 header).
    pub title: String,
    pub epochs: usize,
    pub batch_size: usize,
    pub train_samples: usize,
    pub eval_samples: usize,
    pub classes: usize,
    /// Artificial delay per batch; `0` runs as fast as possible.
    pub batch_delay_ms: u64,
    /// Seed of the simulated learner and the evaluation glyphs.
    pub seed: u64,
    pub streamer: StreamerConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            title: "MNIST CNN".to_owned(),
            epochs: 5,
            batch_size: 32,
            train_samples: 60_000,
            eval_samples: 10_000,
            classes: 10,
            batch_delay_ms: 0,
            seed: 0x5eed,
            streamer: StreamerConfig::default(),
        }
    }
}

impl RunConfig {
    /// Serializes the config to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a config previously written by `save_json` (or by hand).
    pub fn load_json(path: &str) -> Result<RunConfig> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}
