//! Errors surfaced by clock operations.
//!
//! Nothing here is retried by the clocks themselves; retry policy belongs to the caller. Timestamp
//! overflow is deliberately absent: it panics instead, see [`HybridTime::successor`].
use crate::hybrid_time::HybridTime;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    /// The clock cannot perform this operation in its current mode.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(&'static str),
    /// The clock was shut down; it will not issue or accept any more timestamps.
    #[error("clock has been shut down")]
    ShutDown,
    /// [`HybridTime::INVALID`] was offered as an observed timestamp.
    #[error("invalid timestamp {0}")]
    InvalidTimestamp(HybridTime),
    /// Waiting for `target` would outlast the caller's deadline.
    #[error("waiting for {target} would take {required:?}, deadline is in {deadline_in:?}")]
    TimedOut {
        target: HybridTime,
        required: Duration,
        deadline_in: Duration,
    },
    /// An observed timestamp is further ahead of local physical time than the configured skew.
    #[error(
        "observed timestamp {observed} is ahead of physical time {physical_now_micros}us by more than {max_skew_usec}us"
    )]
    ExceedsMaxSkew {
        observed: HybridTime,
        physical_now_micros: u64,
        max_skew_usec: u64,
    },
    /// The physical time source could not be read.
    #[error("physical clock error: {0}")]
    PhysicalClock(String),
}

impl ClockError {
    pub fn is_service_unavailable(&self) -> bool {
        matches!(self, ClockError::ServiceUnavailable(_))
    }

    pub fn is_shut_down(&self) -> bool {
        matches!(self, ClockError::ShutDown)
    }
}
