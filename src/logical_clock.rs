//! A purely logical clock: a Lamport counter shared by every thread of a node.
//!
//! - **Local event or send**: `L := L + 1`, timestamp with `L`.
//! - **Receive of a message timestamped `L(m)`**: `L := max(L, L(m))`. The receive itself is not an
//!   event; the next local event or send yields `L(m) + 1` at the earliest.
//!
//! The counter has no notion of elapsed time. "Now" means "the next unused ordered mark", and the
//! clock never moves on its own, which is why [`LogicalClock`] refuses to wait for a timestamp to
//! pass instead of blocking forever.
use crate::cell::AtomicHybridTime;
use crate::error::ClockError;
use crate::hybrid_time::HybridTime;
use crate::Clock;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

#[derive(Debug)]
pub struct LogicalClock {
    current: AtomicHybridTime,
}

impl LogicalClock {
    /// Creates a clock whose first [`Clock::now`] returns `initial.successor()`.
    ///
    /// [`HybridTime::INVALID`] is refused: a clock always starts out active.
    pub fn create_starting_at(initial: HybridTime) -> Result<Arc<LogicalClock>, ClockError> {
        let current = AtomicHybridTime::starting_at(initial)?;
        info!(%initial, "creating logical clock");
        Ok(Arc::new(LogicalClock { current }))
    }
}

impl Clock for LogicalClock {
    fn now(&self) -> Result<HybridTime, ClockError> {
        self.current.advance_with(HybridTime::successor)
    }

    fn update(&self, observed: HybridTime) -> Result<(), ClockError> {
        if let Some(previous) = self.current.raise_to(observed)? {
            debug!(%previous, %observed, "logical clock raised by observed timestamp");
        }
        Ok(())
    }

    fn is_after(&self, reference: HybridTime) -> Result<bool, ClockError> {
        // Peeking would say "no" right after `reference` was issued by this very clock, so take a
        // fresh mark instead. Any value this clock issued before is then strictly smaller.
        Ok(self.now()? > reference)
    }

    fn wait_until_after(&self, target: HybridTime, _deadline: Instant) -> Result<(), ClockError> {
        debug!(%target, "rejecting wait on a logical clock");
        Err(ClockError::ServiceUnavailable(
            "logical clock does not advance on its own and cannot wait for a timestamp",
        ))
    }

    fn shutdown(&self) {
        if self.current.shut_down() {
            info!("logical clock shut down");
        }
    }

    fn peek(&self) -> Result<HybridTime, ClockError> {
        self.current.load()
    }
}
