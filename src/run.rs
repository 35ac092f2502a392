use std::sync::{Arc, atomic::AtomicBool};
use std::time::Duration;

use log::error;

use crate::config::RunConfig;
use crate::error::Result;
use crate::report::{ReportSession, ReportSurface};
use crate::telemetry::TelemetryStreamer;
use crate::train::{fit, synthetic_glyphs, EpochStats, FitConfig, SimulatedLearner};

/// Optional hooks into a running `run_report`.
#[derive(Default)]
pub struct RunControl {
    pub stop_flag: Option<Arc<AtomicBool>>,
}

/// Streams a complete simulated training run into `surface`.
///
/// Opens a report session, trains a `SimulatedLearner` with a
/// `TelemetryStreamer` attached, and closes the session. If the run fails the
/// report gets an error alert (when the surface still accepts one) and the
/// original error is returned.
pub fn run_report<S: ReportSurface>(surface: S, config: &RunConfig, control: RunControl) -> Result<(S, Vec<EpochStats>)> {
    let eval_set = synthetic_glyphs(config.eval_samples, config.classes, config.seed)?;
    let mut learner = SimulatedLearner::new(config.train_samples, config.classes, config.seed)
        .with_batch_delay(Duration::from_millis(config.batch_delay_ms));

    let mut fit_config = FitConfig::new(config.epochs, config.batch_size);
    fit_config.stop_flag = control.stop_flag;

    let mut session = ReportSession::open(surface, &config.title)?;
    let outcome = TelemetryStreamer::new(session.surface_mut(), eval_set, config.streamer.clone())
        .and_then(|mut streamer| fit(&mut learner, &mut streamer, &fit_config));

    match outcome {
        Ok(history) => Ok((session.close()?, history)),
        Err(e) => {
            error!("training run failed: {}", e);
            if let Err(alert_err) = session.abort(&e.to_string()) {
                error!("could not record the failure in the report: {}", alert_err);
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use crate::report::{Block, RecordingSurface};

    fn small() -> RunConfig {
        RunConfig {
            epochs: 2,
            batch_size: 10,
            train_samples: 250,
            eval_samples: 40,
            ..RunConfig::default()
        }
    }

    #[test]
    fn produces_a_closed_report() {
        let (surface, history) = run_report(RecordingSurface::new(), &small(), RunControl::default()).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].batches, 25);
        assert_eq!(
            surface.blocks().first(),
            Some(&Block::Header { text: "MNIST CNN".into(), level: 1 })
        );
        assert!(matches!(surface.blocks().last(), Some(Block::Alert { .. })));
    }

    #[test]
    fn too_few_eval_samples_abort_the_run() {
        let config = RunConfig { eval_samples: 5, ..small() };
        let (tx, rx) = mpsc::channel();
        let err = run_report(RecordingSurface::with_listener(tx), &config, RunControl::default()).unwrap_err();
        assert!(err.to_string().contains("36 required"));

        let last = rx.try_iter().last().unwrap();
        assert_eq!(last.event_name(), "alert");
    }

    #[test]
    fn stop_flag_ends_the_run_with_a_closed_report() {
        let control = RunControl { stop_flag: Some(Arc::new(AtomicBool::new(true))) };
        let (surface, history) = run_report(RecordingSurface::new(), &small(), control).unwrap();
        assert!(history.is_empty());
        assert!(matches!(
            surface.blocks().last(),
            Some(Block::Alert { kind: crate::report::AlertKind::Success, .. })
        ));
    }
}
