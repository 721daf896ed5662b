use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::Result;
use crate::round::PendingResolution;

/// Deferred match decision for two revealed cards
///
/// The worker waits out the delay on a channel so cancellation wakes it
/// immediately. Dropping the task cancels it.
pub struct SettleTask {
    pending: PendingResolution,
    cancel: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl SettleTask {
    /// Run `on_settle` once `delay` has passed, unless cancelled first
    pub fn schedule<F>(delay: Duration, pending: PendingResolution, on_settle: F) -> Result<Self>
    where
        F: FnOnce(PendingResolution) + Send + 'static,
    {
        let (cancel, cancelled) = mpsc::channel::<()>();

        let worker = thread::Builder::new()
            .name(format!("settle-round-{}", pending.round.0))
            .spawn(move || match cancelled.recv_timeout(delay) {
                Err(RecvTimeoutError::Timeout) => on_settle(pending),
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                    debug!(
                        "Settle of cards {} and {} in round {} cancelled",
                        pending.first, pending.second, pending.round
                    );
                }
            })?;

        Ok(Self {
            pending,
            cancel: Some(cancel),
            worker: Some(worker),
        })
    }

    /// Stop the task if it has not fired yet
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
    }

    /// Wait for the task to fire (or observe an earlier cancel)
    pub fn join(mut self) {
        if let Some(worker) = self.worker.take() {
            if worker.thread().id() == thread::current().id() {
                return;
            }
            if worker.join().is_err() {
                warn!("Settle task for round {} panicked", self.pending.round);
            }
        }
    }

    /// Cancel and hand over the worker so it can be joined later
    pub(crate) fn retire(mut self) -> Option<JoinHandle<()>> {
        self.cancel();
        self.worker.take()
    }
}

impl Drop for SettleTask {
    fn drop(&mut self) {
        self.cancel();
    }
}
