use crate::error::{ReportError, Result};

/// Bookkeeping for the epoch currently being streamed.
///
/// Created by `on_epoch_begin`, dropped when the next epoch begins.
/// `total_samples` is only known once the training loop reports the first
/// batch, so it starts out empty.
#[derive(Debug, Clone, PartialEq)]
pub struct EpochContext {
    pub epoch_index: usize,
    pub total_samples: Option<usize>,
    pub batches_seen: usize,
}

impl EpochContext {
    pub fn new(epoch_index: usize) -> Self {
        EpochContext { epoch_index, total_samples: None, batches_seen: 0 }
    }

    /// Records one finished batch and returns its completion percentage.
    pub fn observe_batch(
        &mut self,
        batch_index: usize,
        batch_size: usize,
        total_samples: usize,
    ) -> Result<u8> {
        let percent = completion_percent(batch_index, batch_size, total_samples)?;
        self.total_samples = Some(total_samples);
        self.batches_seen += 1;
        Ok(percent)
    }
}

/// `ceil(100 * batch_index * batch_size / total_samples)`, clamped to `[0, 100]`.
///
/// Integer arithmetic throughout, so `49 * 32 / 10000` gives exactly 16.
pub fn completion_percent(batch_index: usize, batch_size: usize, total_samples: usize) -> Result<u8> {
    if total_samples == 0 {
        return Err(ReportError::contract("total_samples must be positive"));
    }
    let done = (batch_index as u128) * (batch_size as u128) * 100;
    let total = total_samples as u128;
    let percent = (done + total - 1) / total;
    Ok(percent.min(100) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 32, 10_000, 0)]
    #[case(1, 32, 10_000, 1)]
    #[case(49, 32, 10_000, 16)]
    #[case(50, 200, 10_000, 100)]
    #[case(119, 32, 3_840, 100)]
    #[case(60, 32, 3_840, 50)]
    #[case(400, 32, 3_840, 100)]
    fn completion_is_ceiled_and_clamped(
        #[case] batch: usize,
        #[case] size: usize,
        #[case] total: usize,
        #[case] expected: u8,
    ) {
        assert_eq!(completion_percent(batch, size, total).unwrap(), expected);
    }

    #[test]
    fn zero_total_samples_is_a_contract_violation() {
        assert!(matches!(
            completion_percent(3, 32, 0),
            Err(ReportError::Contract(_))
        ));
    }

    #[test]
    fn observe_batch_tracks_counts() {
        let mut ctx = EpochContext::new(2);
        assert_eq!(ctx.observe_batch(0, 10, 100).unwrap(), 0);
        assert_eq!(ctx.observe_batch(5, 10, 100).unwrap(), 50);
        assert_eq!(ctx.batches_seen, 2);
        assert_eq!(ctx.total_samples, Some(100));
    }

    #[test]
    fn rejected_batch_leaves_context_untouched() {
        let mut ctx = EpochContext::new(0);
        assert!(ctx.observe_batch(1, 10, 0).is_err());
        assert_eq!(ctx, EpochContext::new(0));
    }
}
