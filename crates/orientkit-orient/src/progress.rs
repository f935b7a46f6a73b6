//! Progress reporting for orientation jobs

use orientkit_core::{MessageGuard, ProgressCallback, ThreadSafe};
use parking_lot::Mutex;

/// Job message shared between the job task and the optimizer thread.
pub(crate) type SharedMessage = ThreadSafe<Option<MessageGuard>>;

#[derive(Debug, Default)]
struct TrackerState {
    last: Option<f64>,
    completed: bool,
}

/// Filters optimizer sub-progress into a non-decreasing stream
///
/// Values below the last reported one are dropped. 100 is held back until
/// [`ProgressTracker::complete`], which reports it exactly once.
pub(crate) struct ProgressTracker {
    state: Mutex<TrackerState>,
    listener: ProgressCallback,
    message: SharedMessage,
}

impl ProgressTracker {
    pub(crate) fn new(listener: ProgressCallback, message: SharedMessage) -> Self {
        Self {
            state: Mutex::new(TrackerState::default()),
            listener,
            message,
        }
    }

    pub(crate) fn report(&self, value: f64) {
        if !value.is_finite() {
            return;
        }
        let value = value.max(0.0);
        {
            let mut state = self.state.lock();
            if state.completed || value >= 100.0 || state.last.is_some_and(|last| value < last) {
                return;
            }
            state.last = Some(value);
        }
        self.emit(value);
    }

    pub(crate) fn complete(&self) {
        {
            let mut state = self.state.lock();
            if state.completed {
                return;
            }
            state.completed = true;
            state.last = Some(100.0);
        }
        self.emit(100.0);
    }

    fn emit(&self, value: f64) {
        if let Some(message) = self.message.lock().as_mut() {
            message.set_progress(value);
        }
        (self.listener)(value);
    }
}
