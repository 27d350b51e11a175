//! The single bounded-execution primitive used for provider calls and
//! per-entity bulk steps.

use std::time::Duration;

use tracing::warn;

/// Outcome of a bounded unit of work.
#[derive(Debug)]
pub enum Bounded<T> {
    /// The work finished within the ceiling.
    Completed(T),
    /// The ceiling elapsed first; the worker was abandoned.
    TimedOut,
}

impl<T> Bounded<T> {
    /// The completed value, if any.
    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(v) => Some(v),
            Self::TimedOut => None,
        }
    }
}

/// Run `work` on its own task, waiting at most `ceiling` for it.
///
/// On timeout the task keeps running detached and its eventual result is
/// discarded; it is never force-killed, so work holding sessions or locks
/// unwinds on its own schedule. A worker that panics is reported like a
/// timed-out one.
pub async fn run<T, F>(ceiling: Duration, work: F) -> Bounded<T>
where
    F: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let handle = tokio::spawn(work);
    match tokio::time::timeout(ceiling, handle).await {
        Ok(Ok(value)) => Bounded::Completed(value),
        Ok(Err(join_err)) => {
            warn!(error = %join_err, "bounded worker did not complete");
            Bounded::TimedOut
        }
        Err(_) => Bounded::TimedOut,
    }
}
