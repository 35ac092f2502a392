use std::sync::{Arc, Mutex, atomic::{AtomicBool, Ordering}, mpsc};
use std::thread;
use std::time::Instant;
use tiny_http::Response;
use std::io::Cursor;

use log::{info, warn};

use ferrite_report::{run_report, EpochStats, RecordingSurface, ReportOp, RunConfig, RunControl};

use crate::render::{html_escape, render_flash_html, render_page};
use crate::state::{lock_state, FlashMessage, SharedState, TrainingStatus};

// ---------------------------------------------------------------------------
// GET /
// ---------------------------------------------------------------------------

pub fn handle_get(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let mut st = lock_state(&state);
    let flash      = st.take_flash();
    let run        = st.config.run.clone();
    let is_running = st.training.is_running();
    let badge      = status_badge(&st.training);
    let summary    = build_run_summary(&run, &st.training, &st.epoch_history);
    drop(st);

    let flash_html = render_flash_html(flash.as_ref());

    crate::routes::html_response(render_page(&run.title, is_running, |tmpl| {
        tmpl
            .replace("{{FLASH}}", &flash_html)
            .replace("{{STATUS_BADGE}}", &badge)
            .replace("{{RUN_SUMMARY}}", &summary)
    }))
}

fn status_badge(training: &TrainingStatus) -> String {
    match training {
        TrainingStatus::Idle                                  => "Idle".to_owned(),
        TrainingStatus::Running { .. }                        => "Running".to_owned(),
        TrainingStatus::Done { was_stopped: true,  .. }       => "Stopped".to_owned(),
        TrainingStatus::Done { was_stopped: false, .. }       => "Done".to_owned(),
        TrainingStatus::Failed { reason }                     => format!("Failed: {}", html_escape(reason)),
    }
}

fn build_run_summary(run: &RunConfig, training: &TrainingStatus, history: &[EpochStats]) -> String {
    let epochs = match training {
        TrainingStatus::Running { total_epochs, .. } => *total_epochs,
        _ => run.epochs,
    };
    let mut html = format!(
        r#"<div class="summary-grid">
          <div class="summary-row"><span class="lbl">Epochs</span><span class="val">{epochs}</span></div>
          <div class="summary-row"><span class="lbl">Batch size</span><span class="val">{batch}</span></div>
          <div class="summary-row"><span class="lbl">Train samples</span><span class="val">{train}</span></div>
          <div class="summary-row"><span class="lbl">Eval samples</span><span class="val">{eval}</span></div>
        </div>"#,
        epochs = epochs,
        batch  = run.batch_size,
        train  = run.train_samples,
        eval   = run.eval_samples,
    );

    if let TrainingStatus::Done { elapsed_total_ms, .. } = training {
        let rows: String = history.iter().map(|s| {
            let metrics: String = s.metrics.iter()
                .map(|(k, v)| format!("<td>{}: {:.5}</td>", html_escape(k), v))
                .collect();
            format!("<tr><td>{}</td>{}<td>{} ms</td></tr>", s.epoch + 1, metrics, s.elapsed_ms)
        }).collect();
        html.push_str(&format!(
            r#"<table class="epoch-table"><tbody>{rows}</tbody></table>
            <p class="hint">Total time {secs:.1}s</p>"#,
            rows = rows,
            secs = *elapsed_total_ms as f64 / 1000.0,
        ));
    }
    html
}

// ---------------------------------------------------------------------------
// POST /train/start
// ---------------------------------------------------------------------------

pub fn handle_start(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let mut st = lock_state(&state);

    // If already running, don't start another.
    if st.training.is_running() {
        drop(st);
        return crate::routes::redirect("/");
    }

    let run_config = st.config.run.clone();
    let (tx, rx) = mpsc::channel::<ReportOp>();
    let stop_flag = Arc::new(AtomicBool::new(false));

    st.training = TrainingStatus::Running {
        stop_flag:    stop_flag.clone(),
        op_rx:        Arc::new(Mutex::new(rx)),
        total_epochs: run_config.epochs,
    };
    st.reset_report();
    drop(st);

    info!("starting run '{}' ({} epochs)", run_config.title, run_config.epochs);

    // Spawn background training thread.
    let state_clone = state.clone();
    thread::spawn(move || {
        // Held until the final status is stored, so a stream that sees the
        // channel disconnect always finds the run finished.
        let status_guard = tx.clone();

        let control = RunControl { stop_flag: Some(stop_flag.clone()) };
        let t_start = Instant::now();
        let result = run_report(RecordingSurface::with_listener(tx), &run_config, control);
        let elapsed_total_ms = t_start.elapsed().as_millis() as u64;

        let mut st = lock_state(&state_clone);
        st.drain_pending_ops();
        let status = match result {
            Ok((_surface, history)) => {
                let status = TrainingStatus::Done {
                    elapsed_total_ms,
                    was_stopped: stop_flag.load(Ordering::Relaxed),
                    epochs_completed: history.len(),
                };
                st.epoch_history = history;
                status
            }
            Err(e) => {
                warn!("run '{}' failed: {}", run_config.title, e);
                TrainingStatus::Failed { reason: e.to_string() }
            }
        };
        st.training = status;
        drop(st);
        drop(status_guard);
    });

    crate::routes::redirect("/")
}

// ---------------------------------------------------------------------------
// POST /train/stop
// ---------------------------------------------------------------------------

pub fn handle_stop(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let mut st = lock_state(&state);
    let stopping = match &st.training {
        TrainingStatus::Running { stop_flag, .. } => {
            stop_flag.store(true, Ordering::Relaxed);
            true
        }
        _ => false,
    };
    st.flash = Some(if stopping {
        FlashMessage::success("Stop requested; the run ends after the current epoch.")
    } else {
        FlashMessage::error("No run is in progress.")
    });
    drop(st);
    crate::routes::redirect("/")
}
