use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// How long an error stays visible before it clears itself.
pub const DISMISS_AFTER: Duration = Duration::from_millis(3500);

#[derive(Default)]
struct NoticeState {
    message: Option<String>,
    seq: u64,
}

/// Holds the single user-visible error message and clears it after a fixed
/// delay.
///
/// A newer message cancels the older message's clear timer, so the newer one
/// always gets its full display window; a sequence number is checked again at
/// clear time so a stale timer can never wipe a fresher message.
pub struct ErrorPresenter {
    state: Arc<Mutex<NoticeState>>,
    dismiss_after: Duration,
    timer: Option<JoinHandle<()>>,
}

impl ErrorPresenter {
    pub fn new() -> Self {
        Self::with_dismiss_after(DISMISS_AFTER)
    }

    pub fn with_dismiss_after(dismiss_after: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(NoticeState::default())),
            dismiss_after,
            timer: None,
        }
    }

    /// Make `message` the active error and schedule its dismissal, replacing
    /// any currently shown error and its pending timer.
    pub fn show(&mut self, message: impl Into<String>) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }

        let seq = {
            let mut state = self.state.lock();
            state.seq += 1;
            state.message = Some(message.into());
            state.seq
        };

        let state = Arc::clone(&self.state);
        // Create the sleep here so the dismissal deadline is anchored to the
        // moment the message is shown, not to the spawned task's first poll.
        let timer = sleep(self.dismiss_after);
        self.timer = Some(tokio::spawn(async move {
            timer.await;
            let mut state = state.lock();
            if state.seq == seq {
                state.message = None;
            }
        }));
    }

    /// The currently visible error, if any.
    pub fn active(&self) -> Option<String> {
        self.state.lock().message.clone()
    }
}

impl Default for ErrorPresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ErrorPresenter {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}
