//! Progress and job-event envelopes streamed by bulk jobs.

use serde::{Deserialize, Serialize};

use crate::seasonality::IndustryRanking;

/// A single progress tick from a running bulk job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Entities handled so far, including the one being announced.
    pub current: usize,
    /// Total entities the job will attempt.
    pub total: usize,
    /// Human-readable description of the current step.
    pub message: String,
    /// `current / total` in whole percent, floored, clamped to 100.
    pub percent: u8,
}

impl Progress {
    /// Build a tick, deriving `percent` from the counters.
    #[must_use]
    pub fn new(current: usize, total: usize, message: impl Into<String>) -> Self {
        let percent = if total == 0 {
            0
        } else {
            u8::try_from((current * 100 / total).min(100)).unwrap_or(100)
        };
        Self {
            current,
            total,
            message: message.into(),
            percent,
        }
    }
}

/// Event envelope delivered over a progress channel.
///
/// Every job stream carries zero or more `Progress` events followed by
/// exactly one terminal event (`Finished` or `Failed`), and nothing after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobEvent<T> {
    /// A non-terminal progress tick.
    Progress(Progress),
    /// Terminal: the job ran to completion with this outcome.
    Finished(T),
    /// Terminal: the job could not run to completion.
    Failed {
        /// Human-readable reason.
        message: String,
    },
}

impl<T> JobEvent<T> {
    /// Whether this event ends the stream.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished(_) | Self::Failed { .. })
    }
}

/// Outcome of a completed industry ranking job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankOutcome {
    /// Rankings sorted by up-probability descending, truncated to the
    /// requested limit.
    pub rankings: Vec<IndustryRanking>,
    /// Number of industries the job attempted.
    pub attempted: usize,
    /// Industries that produced a report.
    pub succeeded: usize,
    /// Industries that failed, timed out, or produced no report.
    pub failed: usize,
}

/// Outcome of a completed data refresh job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshOutcome {
    /// New stocks added to the store from the provider catalog.
    pub catalog_added: usize,
    /// New month points written across all stocks.
    pub points_upserted: usize,
    /// Number of stocks the job attempted.
    pub attempted: usize,
    /// Stocks refreshed without error (including already-up-to-date ones).
    pub succeeded: usize,
    /// Stocks that failed or timed out.
    pub failed: usize,
}
