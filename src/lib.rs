//! Timestamp clocks for ordering events in a distributed database.
//!
//! The Lamport Clock Condition gives that if `a` happens before `b` (denoted `a -> b`), then
//! `TS(a) < TS(b)`. Every clock here upholds it for the events of one node: each timestamp it
//! issues is greater than every timestamp it issued or was told about before. Propagating
//! timestamps between nodes (stamping outgoing messages with [`Clock::now`] and feeding inbound
//! ones to [`Clock::update`]) is the caller's job.
//!
//! Two variants implement [`Clock`]:
//! - [`LogicalClock`] advances only when asked to, and therefore cannot wait for time to pass.
//! - [`HybridClock`] mixes a physical time source into its timestamps and can.
use std::sync::Arc;
use std::time::Instant;

mod cell;
pub mod config;
pub mod error;
pub mod hybrid_clock;
pub mod hybrid_time;
pub mod logical_clock;
pub mod physical;

pub use config::ClockConfig;
pub use error::ClockError;
pub use hybrid_clock::HybridClock;
pub use hybrid_time::HybridTime;
pub use logical_clock::LogicalClock;

/// Shared handle to a clock. One clock is created per process (or per component) and handed to
/// every subsystem that stamps or observes timestamps.
pub type ClockHandle = Arc<dyn Clock>;

/// A source of causally ordered timestamps, shared by every thread of a node.
pub trait Clock: Send + Sync {
    /// Advances the clock and returns the new value. Values returned by successive calls, from any
    /// number of threads, are strictly increasing and never repeat.
    fn now(&self) -> Result<HybridTime, ClockError>;

    /// Folds an externally observed timestamp into the clock, so that every later [`Clock::now`]
    /// orders strictly after it. Observations the clock already dominates are a successful no-op.
    fn update(&self, observed: HybridTime) -> Result<(), ClockError>;

    /// Returns whether the clock has causally moved past `reference`. This advances the clock.
    fn is_after(&self, reference: HybridTime) -> Result<bool, ClockError>;

    /// Blocks until any timestamp the clock issues is guaranteed to be after `target`, or fails if
    /// that cannot happen before `deadline`.
    fn wait_until_after(&self, target: HybridTime, deadline: Instant) -> Result<(), ClockError>;

    /// Irreversibly stops the clock. Idempotent.
    fn shutdown(&self);

    /// Reads the latest value without advancing, for diagnostics only. Never use the result to make
    /// ordering decisions; only [`Clock::now`] and [`Clock::is_after`] are ordering-safe.
    fn peek(&self) -> Result<HybridTime, ClockError>;
}
