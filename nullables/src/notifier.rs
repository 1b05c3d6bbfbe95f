//! Nullable notifier: record events instead of delivering them.

use ballot_election::{ElectionEvent, NotificationPort, NotifyError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// A notification port that records every published event.
///
/// Can be switched into a failing mode to check that delivery failures do
/// not affect election state. Events are recorded even while failing.
pub struct NullNotifier {
    events: Mutex<Vec<ElectionEvent>>,
    failing: AtomicBool,
}

impl NullNotifier {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
        }
    }

    /// Make subsequent publishes report failure.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// All recorded events, in publish order.
    pub fn events(&self) -> Vec<ElectionEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Drain the recorded events.
    pub fn take(&self) -> Vec<ElectionEvent> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for NullNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationPort for NullNotifier {
    fn publish(&self, event: &ElectionEvent) -> Result<(), NotifyError> {
        self.events.lock().unwrap().push(event.clone());
        if self.failing.load(Ordering::SeqCst) {
            Err(NotifyError::Rejected("null notifier set to fail".into()))
        } else {
            Ok(())
        }
    }
}
