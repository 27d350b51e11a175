//! Single-producer single-consumer progress channel for bulk jobs.
//!
//! The sender side lives inside the job task; terminal sends consume it,
//! making "exactly one terminal event, nothing after" a type-level
//! guarantee. The receiver latches after delivering a terminal event and
//! returns `None` from then on.

use tokio::sync::mpsc;

use stagione_core::{JobEvent, Progress};

/// Create a progress channel for one job.
#[must_use]
pub fn channel<T>() -> (ProgressSender<T>, ProgressReceiver<T>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        ProgressSender { tx },
        ProgressReceiver { rx, done: false },
    )
}

/// Producer half, owned by the job task.
///
/// Sends never block and never fail the job: when the consumer is gone the
/// events are dropped and the job keeps running to completion (its side
/// effects, store writes and session teardown, still matter).
pub struct ProgressSender<T> {
    tx: mpsc::UnboundedSender<JobEvent<T>>,
}

impl<T> ProgressSender<T> {
    /// Emit a progress tick.
    pub fn progress(&self, current: usize, total: usize, message: impl Into<String>) {
        let _ = self
            .tx
            .send(JobEvent::Progress(Progress::new(current, total, message)));
    }

    /// Terminal: the job finished with `outcome`. Consumes the sender.
    pub fn finish(self, outcome: T) {
        let _ = self.tx.send(JobEvent::Finished(outcome));
    }

    /// Terminal: the job could not run to completion. Consumes the sender.
    pub fn fail(self, message: impl Into<String>) {
        let _ = self.tx.send(JobEvent::Failed {
            message: message.into(),
        });
    }
}

/// Consumer half, handed to the caller when a job starts.
#[derive(Debug)]
pub struct ProgressReceiver<T> {
    rx: mpsc::UnboundedReceiver<JobEvent<T>>,
    done: bool,
}

impl<T> ProgressReceiver<T> {
    /// Receive the next event; `None` once a terminal event has been
    /// delivered (or the job task dropped its sender without one, which
    /// indicates a bug in the job).
    pub async fn recv(&mut self) -> Option<JobEvent<T>> {
        if self.done {
            return None;
        }
        let event = self.rx.recv().await?;
        if event.is_terminal() {
            self.done = true;
        }
        Some(event)
    }

    /// Drain the stream to its end, returning every event in order.
    pub async fn collect_all(mut self) -> Vec<JobEvent<T>> {
        let mut events = Vec::new();
        while let Some(ev) = self.recv().await {
            events.push(ev);
        }
        events
    }
}
