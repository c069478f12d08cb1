//! Fixed-interval reload driver.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::coordinator::ReloadRequester;
use super::ReloadDriver;

/// Requests a reload every `interval`, whether or not anything changed.
///
/// For filesystems without reliable change notifications.
pub struct PollDriver {
    interval: Duration,
    stop_tx: Sender<()>,
    thread: Option<JoinHandle<()>>,
}

impl PollDriver {
    /// Start polling.
    pub fn start(interval: Duration, requester: ReloadRequester) -> Self {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let thread = thread::spawn(move || loop {
            match stop_rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => {
                    if !requester.request() {
                        break;
                    }
                }
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        });

        tracing::info!("Polling templates every {:?}", interval);
        Self {
            interval,
            stop_tx,
            thread: Some(thread),
        }
    }

    /// The poll interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl ReloadDriver for PollDriver {
    fn name(&self) -> &'static str {
        "poll"
    }

    fn stop(mut self: Box<Self>) {
        let _ = self.stop_tx.send(());
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
