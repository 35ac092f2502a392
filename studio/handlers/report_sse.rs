use std::io::Write;
use std::sync::PoisonError;
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;
use tiny_http::Request;

use log::{debug, warn};
use serde_json::json;

use crate::state::{lock_state, SharedState, TrainingStatus};
use crate::util::sse::{format_sse_event, format_sse_keepalive, op_frame, write_sse, SSE_RESPONSE_HEAD};

/// `GET /report/events`: Server-Sent Events handler.
///
/// Takes ownership of `request` (for `into_writer`) and:
/// 1. Replays every op already in the report history, so a late or
///    reconnecting client rebuilds the whole report.
/// 2. While the run is live, receives ops from the run channel with a
///    500 ms timeout, records them and forwards them. A timeout writes a
///    `: ping` keep-alive comment.
/// 3. Once the channel disconnects (or when no run is live), sends whatever
///    history is still unsent followed by one final `done`, `stopped`,
///    `failed` or `idle` event, then closes.
pub fn handle(request: Request, state: SharedState) {
    let mut writer = request.into_writer();
    if !write_sse(&mut writer, SSE_RESPONSE_HEAD) {
        return;
    }

    // Clone the receiver Arc out so we don't hold the state lock.
    let op_rx = match &lock_state(&state).training {
        TrainingStatus::Running { op_rx, .. } => Some(op_rx.clone()),
        _ => None,
    };

    let mut cursor = 0usize;
    if !send_history(&mut writer, &state, &mut cursor) {
        return;
    }

    if let Some(rx_arc) = op_rx {
        loop {
            let result = {
                let rx = rx_arc.lock().unwrap_or_else(PoisonError::into_inner);
                rx.recv_timeout(Duration::from_millis(500))
            };

            match result {
                Ok(op) => {
                    lock_state(&state).record(op);
                    if !send_history(&mut writer, &state, &mut cursor) { return; }
                }
                Err(RecvTimeoutError::Timeout) => {
                    if !write_sse(&mut writer, format_sse_keepalive()) { return; }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    // The run thread has drained the channel into the
                    // history; pick up whatever this stream has not sent.
                    if !send_history(&mut writer, &state, &mut cursor) { return; }
                    break;
                }
            }
        }
    }

    let _ = write_sse(&mut writer, &final_event(&state));
    debug!("report stream closed after {} ops", cursor);
}

/// Writes `report_history[cursor..]` and advances `cursor`.
/// Returns `false` if the client went away.
fn send_history<W: Write>(writer: &mut W, state: &SharedState, cursor: &mut usize) -> bool {
    let frames = {
        let st = lock_state(state);
        let pending = st.report_history.get(*cursor..).unwrap_or(&[]);
        let frames: Vec<String> = pending
            .iter()
            .filter_map(|op| match op_frame(op) {
                Ok(frame) => Some(frame),
                Err(e) => {
                    warn!("skipping unserializable {} op: {}", op.event_name(), e);
                    None
                }
            })
            .collect();
        *cursor = st.report_history.len();
        frames
    };
    frames.iter().all(|frame| write_sse(writer, frame))
}

/// The event that tells the client the stream is complete.
fn final_event(state: &SharedState) -> String {
    let st = lock_state(state);
    let (name, data) = match &st.training {
        TrainingStatus::Done { elapsed_total_ms, was_stopped, epochs_completed } => (
            if *was_stopped { "stopped" } else { "done" },
            json!({
                "elapsed_total_ms": elapsed_total_ms,
                "epochs_completed": epochs_completed,
            }),
        ),
        TrainingStatus::Failed { reason } => ("failed", json!({ "reason": reason })),
        TrainingStatus::Idle | TrainingStatus::Running { .. } => ("idle", json!({})),
    };
    format_sse_event(name, &data.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use ferrite_report::ReportOp;

    use crate::config::StudioConfig;
    use crate::state::StudioState;

    fn shared() -> SharedState {
        Arc::new(Mutex::new(StudioState::new(StudioConfig::default())))
    }

    #[test]
    fn history_is_sent_once() {
        let state = shared();
        lock_state(&state).record(ReportOp::Header { text: "Epoch 1".into(), level: 3 });

        let mut out: Vec<u8> = Vec::new();
        let mut cursor = 0;
        assert!(send_history(&mut out, &state, &mut cursor));
        lock_state(&state).record(ReportOp::Progress { id: 2, percent: 0 });
        assert!(send_history(&mut out, &state, &mut cursor));
        assert_eq!(cursor, 2);

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("event: header\n").count(), 1);
        assert_eq!(text.matches("event: progress\n").count(), 1);
    }

    #[test]
    fn final_event_reflects_status() {
        let state = shared();
        assert!(final_event(&state).starts_with("event: idle\n"));

        lock_state(&state).training = TrainingStatus::Done {
            elapsed_total_ms: 10,
            was_stopped: true,
            epochs_completed: 1,
        };
        assert!(final_event(&state).starts_with("event: stopped\n"));

        lock_state(&state).training = TrainingStatus::Failed { reason: "boom".into() };
        assert_eq!(final_event(&state), "event: failed\ndata: {\"reason\":\"boom\"}\n\n");
    }
}
