use crate::error::Result;
use crate::metrics::{MetricSample, LOSS, ACCURACY};

/// One-line summary of the latest batch: `loss: 0.12345 | acc: 0.98765`.
pub fn batch_summary(sample: &MetricSample) -> Result<String> {
    let loss = sample.require(LOSS)?;
    let acc = sample.require(ACCURACY)?;
    Ok(format!("loss: {:>7.5} | acc: {:>7.5}", loss, acc))
}

/// Every metric on its own line, keys right-aligned to 8 columns.
pub fn metric_dump(sample: &MetricSample) -> String {
    sample
        .iter()
        .map(|(k, v)| format!("{:>8} : {:>8.5}", k, v))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Text of the run-level counter after `epoch` finished.
pub fn epoch_counter(epoch: usize, dump: &str) -> String {
    if dump.is_empty() {
        return initial_counter_at(epoch);
    }
    format!("{}\n{}", initial_counter_at(epoch), dump)
}

/// Text of the run-level counter before the first epoch finished.
pub fn initial_counter() -> String {
    initial_counter_at(0)
}

fn initial_counter_at(epoch: usize) -> String {
    format!("{:>8} :  {}", "epoch", epoch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_summary_is_fixed_width() {
        let s = batch_summary(&MetricSample::loss_accuracy(0.5, 0.25)).unwrap();
        assert_eq!(s, "loss: 0.50000 | acc: 0.25000");
        let s = batch_summary(&MetricSample::loss_accuracy(12.0, 1.0)).unwrap();
        assert_eq!(s, "loss: 12.00000 | acc: 1.00000");
    }

    #[test]
    fn batch_summary_needs_both_metrics() {
        assert!(batch_summary(&MetricSample::new().with(LOSS, 1.0)).is_err());
    }

    #[test]
    fn dump_keeps_sample_order() {
        let sample = MetricSample::loss_accuracy(0.1, 0.9).with("val_loss", 0.2);
        assert_eq!(
            metric_dump(&sample),
            "    loss :  0.10000\naccuracy :  0.90000\nval_loss :  0.20000"
        );
    }

    #[test]
    fn counter_prefixes_the_dump() {
        assert_eq!(initial_counter(), "   epoch :  0");
        assert_eq!(epoch_counter(3, "    loss :  0.10000"), "   epoch :  3\n    loss :  0.10000");
        assert_eq!(epoch_counter(1, ""), "   epoch :  1");
    }
}
