use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};

/// Delayed echo of a rapidly-changing text value.
///
/// Feed every edit through [`Debouncer::input`]; the output updates only once
/// the value has been left alone for the configured interval. A new edit
/// restarts the interval and drops the pending value, so intermediate values
/// are never observed downstream.
pub struct Debouncer {
    tx: mpsc::UnboundedSender<String>,
    output: watch::Receiver<Option<String>>,
    worker: JoinHandle<()>,
}

impl Debouncer {
    pub fn new(interval: Duration) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        let (out_tx, output) = watch::channel(None);

        let worker = tokio::spawn(async move {
            let mut pending: Option<(String, Instant)> = None;
            loop {
                let deadline = pending.as_ref().map_or_else(Instant::now, |(_, at)| *at);
                tokio::select! {
                    input = rx.recv() => match input {
                        Some(value) => pending = Some((value, Instant::now() + interval)),
                        None => break,
                    },
                    () = sleep_until(deadline), if pending.is_some() => {
                        if let Some((value, _)) = pending.take() {
                            let _ = out_tx.send(Some(value));
                        }
                    }
                }
            }
        });

        Self { tx, output, worker }
    }

    /// Record a new input value, restarting the quiescence interval.
    pub fn input(&self, value: impl Into<String>) {
        let _ = self.tx.send(value.into());
    }

    /// Channel carrying the debounced value. Holds `None` until the first
    /// value settles.
    pub fn output(&self) -> watch::Receiver<Option<String>> {
        self.output.clone()
    }

    /// Wait for the next settled value.
    pub async fn settled(&mut self) -> Option<String> {
        if self.output.changed().await.is_err() {
            return None;
        }
        self.output.borrow_and_update().clone()
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    const INTERVAL: Duration = Duration::from_millis(500);

    #[tokio::test(start_paused = true)]
    async fn only_final_value_settles() {
        let mut debouncer = Debouncer::new(INTERVAL);

        debouncer.input("L");
        advance(Duration::from_millis(200)).await;
        debouncer.input("Lo");
        advance(Duration::from_millis(200)).await;
        debouncer.input("Lon");

        let settled = debouncer.settled().await;
        assert_eq!(settled.as_deref(), Some("Lon"));
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_propagates_before_the_interval_elapses() {
        let debouncer = Debouncer::new(INTERVAL);

        debouncer.input("London");
        advance(Duration::from_millis(499)).await;

        assert!(debouncer.output().borrow().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn new_input_restarts_the_interval() {
        let debouncer = Debouncer::new(INTERVAL);

        debouncer.input("Lond");
        advance(Duration::from_millis(400)).await;
        debouncer.input("London");
        // 600 ms after the first edit, only 200 ms after the second.
        advance(Duration::from_millis(200)).await;

        assert!(debouncer.output().borrow().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn each_stable_value_settles_in_turn() {
        let mut debouncer = Debouncer::new(INTERVAL);

        debouncer.input("London");
        assert_eq!(debouncer.settled().await.as_deref(), Some("London"));

        debouncer.input("Tokyo");
        assert_eq!(debouncer.settled().await.as_deref(), Some("Tokyo"));
    }
}
