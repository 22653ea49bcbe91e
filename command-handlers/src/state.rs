//! Dispatcher-owned mutable state: the last-saved-file pointer and the
//! training gate. Replaces the process-wide globals of older bots of this
//! shape; the training flag is released through an RAII guard on every exit
//! path.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::info;

/// Shared dispatcher state, one instance per bot process.
pub struct DispatcherState {
    started_at: Instant,
    training: AtomicBool,
    last_saved: Mutex<Option<PathBuf>>,
}

impl DispatcherState {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            training: AtomicBool::new(false),
            last_saved: Mutex::new(None),
        }
    }

    /// Time since the dispatcher started.
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Records the most recent `add` target. Overwrites any previous pointer.
    pub async fn record_saved(&self, path: PathBuf) {
        info!(path = %path.display(), "Recorded last saved file");
        *self.last_saved.lock().await = Some(path);
    }

    /// Current last-saved pointer, if any.
    pub async fn last_saved(&self) -> Option<PathBuf> {
        self.last_saved.lock().await.clone()
    }

    /// Clears the pointer after an undo.
    pub async fn clear_last_saved(&self) {
        *self.last_saved.lock().await = None;
    }

    pub fn is_training(&self) -> bool {
        self.training.load(Ordering::Acquire)
    }

    /// Attempts to take the training gate. Returns `None` when a run is
    /// already in progress; the returned guard releases the gate when
    /// dropped, so failures inside the handler cannot wedge it.
    pub fn try_begin_training(self: &Arc<Self>) -> Option<TrainingGuard> {
        self.training
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| TrainingGuard {
                state: Arc::clone(self),
            })
    }
}

impl Default for DispatcherState {
    fn default() -> Self {
        Self::new()
    }
}

/// Holds the training gate; releases it on drop.
pub struct TrainingGuard {
    state: Arc<DispatcherState>,
}

impl Drop for TrainingGuard {
    fn drop(&mut self) {
        self.state.training.store(false, Ordering::Release);
    }
}
