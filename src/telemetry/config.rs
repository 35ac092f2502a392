use serde::{Serialize, Deserialize};

use crate::error::{ReportError, Result};

/// Tuning knobs of the telemetry streamer.
///
/// # Fields
/// - `epoch_flush_stride`  : per-epoch chart flushes on batches `0, n, 2n, ...`
/// - `summary_flush_stride`: summary chart flushes on global batches `n-1, 2n-1, ...`
/// - `example_count`       : evaluation examples drawn after every epoch
/// - `summary_chart_height`: pixel height of the summary chart
/// - `epoch_chart_height`  : pixel height of per-epoch charts (`0` = surface default)
/// - `sample_seed`         : fixes example selection; `None` draws from entropy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamerConfig {
    pub epoch_flush_stride: usize,
    pub summary_flush_stride: usize,
    pub example_count: usize,
    pub summary_chart_height: u32,
    pub epoch_chart_height: u32,
    pub sample_seed: Option<u64>,
}

impl Default for StreamerConfig {
    fn default() -> Self {
        StreamerConfig {
            epoch_flush_stride: 10,
            summary_flush_stride: 100,
            example_count: 36,
            summary_chart_height: 300,
            epoch_chart_height: 0,
            sample_seed: None,
        }
    }
}

impl StreamerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.epoch_flush_stride == 0 || self.summary_flush_stride == 0 {
            return Err(ReportError::contract("flush strides must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg: StreamerConfig = serde_json::from_str(r#"{ "example_count": 16 }"#).unwrap();
        assert_eq!(cfg.example_count, 16);
        assert_eq!(cfg.epoch_flush_stride, 10);
        assert_eq!(cfg.summary_flush_stride, 100);
        assert_eq!(cfg.sample_seed, None);
    }

    #[test]
    fn zero_stride_is_rejected() {
        let cfg = StreamerConfig { epoch_flush_stride: 0, ..StreamerConfig::default() };
        assert!(cfg.validate().is_err());
        assert!(StreamerConfig::default().validate().is_ok());
    }
}
