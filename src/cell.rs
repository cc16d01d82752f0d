//! A `HybridTime` stored in a single atomic word.
//!
//! Every clock keeps its whole state in one of these. The shut-down state is the
//! [`HybridTime::INVALID`] sentinel stored in the same word, so shutting down is linearizable with
//! every advance and merge: an operation either installs its value before the sentinel lands or
//! observes the sentinel and fails.
use crate::error::ClockError;
use crate::hybrid_time::HybridTime;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug)]
pub(crate) struct AtomicHybridTime {
    value: AtomicU64,
}

impl AtomicHybridTime {
    /// Creates an active cell. The shut-down sentinel cannot be a starting value.
    pub(crate) fn starting_at(initial: HybridTime) -> Result<Self, ClockError> {
        if !initial.is_valid() {
            return Err(ClockError::InvalidTimestamp(initial));
        }
        Ok(Self {
            value: AtomicU64::new(initial.value()),
        })
    }

    /// Reads the current value, failing if the cell holds the shut-down sentinel.
    pub(crate) fn load(&self) -> Result<HybridTime, ClockError> {
        active(self.value.load(Ordering::Acquire))
    }

    /// Atomically replaces the current value with `next(current)` and returns what was installed.
    ///
    /// `next` may run several times if other threads win the race, so it must be pure. It must also
    /// return something strictly greater than its argument, otherwise two callers could both
    /// install (and return) the same value.
    pub(crate) fn advance_with(
        &self,
        mut next: impl FnMut(HybridTime) -> HybridTime,
    ) -> Result<HybridTime, ClockError> {
        let mut current = self.value.load(Ordering::Acquire);
        loop {
            let proposed = next(active(current)?);
            debug_assert!(proposed.value() > current);
            match self.value.compare_exchange_weak(
                current,
                proposed.value(),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Ok(proposed),
                Err(actual) => current = actual,
            }
        }
    }

    /// Raises the stored value to `observed` unless it is already at least that large.
    ///
    /// Returns the previous value when the cell was raised, or `None` when it already dominated.
    pub(crate) fn raise_to(&self, observed: HybridTime) -> Result<Option<HybridTime>, ClockError> {
        if !observed.is_valid() {
            return Err(ClockError::InvalidTimestamp(observed));
        }
        let mut current = self.value.load(Ordering::Acquire);
        loop {
            let previous = active(current)?;
            if observed <= previous {
                return Ok(None);
            }
            match self.value.compare_exchange_weak(
                current,
                observed.value(),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Ok(Some(previous)),
                Err(actual) => current = actual,
            }
        }
    }

    /// Installs the shut-down sentinel. Returns `true` only for the call that actually did it.
    pub(crate) fn shut_down(&self) -> bool {
        self.value.swap(HybridTime::INVALID.value(), Ordering::AcqRel) != HybridTime::INVALID.value()
    }
}

#[inline]
fn active(raw: u64) -> Result<HybridTime, ClockError> {
    let ht = HybridTime::new(raw);
    if ht.is_valid() {
        Ok(ht)
    } else {
        Err(ClockError::ShutDown)
    }
}
