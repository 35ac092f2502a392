use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, atomic::AtomicBool, mpsc};

use image::GrayImage;
use ferrite_report::{EpochStats, ReportOp};

use crate::config::StudioConfig;

// ---------------------------------------------------------------------------
// Training status
// ---------------------------------------------------------------------------

pub enum TrainingStatus {
    /// No run has been started yet.
    Idle,
    /// A run is streaming its report from a background thread.
    Running {
        stop_flag:    Arc<AtomicBool>,
        op_rx:        Arc<Mutex<mpsc::Receiver<ReportOp>>>,
        total_epochs: usize,
    },
    /// The run finished, either naturally or after Stop.
    Done {
        elapsed_total_ms: u64,
        was_stopped:      bool,
        epochs_completed: usize,
    },
    /// The run ended with an error; the report carries an error alert.
    Failed {
        reason: String,
    },
}

impl TrainingStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, TrainingStatus::Running { .. })
    }
}

// ---------------------------------------------------------------------------
// Flash messages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum FlashKind { Success, Error }

#[derive(Debug, Clone)]
pub struct FlashMessage {
    pub kind: FlashKind,
    pub text: String,
}

impl FlashMessage {
    pub fn success(text: impl Into<String>) -> Self {
        FlashMessage { kind: FlashKind::Success, text: text.into() }
    }
    pub fn error(text: impl Into<String>) -> Self {
        FlashMessage { kind: FlashKind::Error, text: text.into() }
    }
}

// ---------------------------------------------------------------------------
// Main state struct
// ---------------------------------------------------------------------------

pub struct StudioState {
    pub config:         StudioConfig,
    /// Current run lifecycle state.
    pub training:       TrainingStatus,
    /// Every report op of the most recent run, in call order.
    pub report_history: Vec<ReportOp>,
    /// Pixels of every example tile in `report_history`, by tile id.
    pub images:         HashMap<u64, GrayImage>,
    /// Per-epoch stats of the most recent finished run.
    pub epoch_history:  Vec<EpochStats>,
    /// One-shot flash message for the next page render.
    pub flash:          Option<FlashMessage>,
}

impl StudioState {
    pub fn new(config: StudioConfig) -> Self {
        StudioState {
            config,
            training:       TrainingStatus::Idle,
            report_history: Vec::new(),
            images:         HashMap::new(),
            epoch_history:  Vec::new(),
            flash:          None,
        }
    }

    /// Appends `op` to the history, indexing any image tiles it carries.
    pub fn record(&mut self, op: ReportOp) {
        if let ReportOp::ImageGrid { tiles, .. } = &op {
            for tile in tiles {
                self.images.insert(tile.id, tile.pixels.clone());
            }
        }
        self.report_history.push(op);
    }

    /// Moves every op still queued in the run channel into the history.
    pub fn drain_pending_ops(&mut self) {
        let pending: Vec<ReportOp> = match &self.training {
            TrainingStatus::Running { op_rx, .. } => {
                let rx = op_rx.lock().unwrap_or_else(PoisonError::into_inner);
                rx.try_iter().collect()
            }
            _ => Vec::new(),
        };
        for op in pending {
            self.record(op);
        }
    }

    /// Forgets everything about the previous run.
    pub fn reset_report(&mut self) {
        self.report_history.clear();
        self.images.clear();
        self.epoch_history.clear();
    }

    /// Takes and returns the current flash message, clearing it.
    pub fn take_flash(&mut self) -> Option<FlashMessage> {
        self.flash.take()
    }
}

/// Shared state type: an `Arc<Mutex<StudioState>>` passed to every handler.
pub type SharedState = Arc<Mutex<StudioState>>;

/// Locks the shared state. A handler thread that panicked mid-update leaves
/// the state usable, so poisoning is ignored.
pub fn lock_state(state: &SharedState) -> MutexGuard<'_, StudioState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
