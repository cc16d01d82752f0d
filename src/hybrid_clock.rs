//! The goal of HLC is to provide one-way causality detection similar to that provided by lamport
//! clocks, while keeping the clock value always close to physical time.
//!
//! Formally, given a distributed system, we need to assign each event `e` a timestamp, `L(e)`,
//! such that:
//!   1. `e -> f => L(e) < L(f),`
//!   2. `L(e)` is represented with bounded space (one 64-bit word here), and
//!   3. `L(e)` is *close* to the physical time of `e`, i.e. `| L(e) - PT(e) |` is bounded.
//!
//! A timestamp is split into two parts: `L`, the maximum physical time heard of so far, and `C`, a
//! counter that orders events sharing the same `L`. Pairs are compared lexicographically, which is
//! exactly integer comparison once `L` is stored in the high bits of a [`HybridTime`] and `C` in
//! the low [`BITS_FOR_LOGICAL_COMPONENT`](crate::hybrid_time::BITS_FOR_LOGICAL_COMPONENT) bits.
//!
//! ## The algorithm on a packed timestamp
//! - **Send or local event**: `T := max(T + 1, (PT, 0))`. If physical time moved past `L` the
//!   counter resets, otherwise it is bumped.
//! - **Receive event of message `m`**: `T := max(T, T(m))`, refusing `T(m)` when its physical part
//!   is further ahead of `PT` than the configured maximum clock skew. As with the logical clock the
//!   next local event is what moves the clock past `T(m)`.
//!
//! Unlike [`LogicalClock`](crate::LogicalClock), this clock can wait for a timestamp to pass: once
//! `PT - max_error` is beyond the timestamp's physical part, no correctly synchronised node can
//! issue anything ordered before it any more.
use crate::cell::AtomicHybridTime;
use crate::error::ClockError;
use crate::hybrid_time::HybridTime;
use crate::physical::PhysicalClock;
use crate::Clock;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub struct HybridClock {
    current: AtomicHybridTime,
    physical: Arc<dyn PhysicalClock>,
    /// How far ahead of local physical time an observed timestamp may be before it is refused.
    max_clock_skew_usec: u64,
}

impl HybridClock {
    pub fn create_starting_at(
        initial: HybridTime,
        physical: Arc<dyn PhysicalClock>,
        max_clock_skew_usec: u64,
    ) -> Result<Arc<HybridClock>, ClockError> {
        let current = AtomicHybridTime::starting_at(initial)?;
        info!(%initial, max_clock_skew_usec, "creating hybrid clock");
        Ok(Arc::new(HybridClock {
            current,
            physical,
            max_clock_skew_usec,
        }))
    }

    /// Advances the clock like [`Clock::now`] and also returns the error bound of the physical
    /// reading that went into it, in microseconds.
    pub fn now_with_error(&self) -> Result<(HybridTime, u64), ClockError> {
        let pt = self.physical.now()?;
        let physical_now = HybridTime::from_micros_and_logical(pt.time_point_micros, 0);
        let now = self
            .current
            .advance_with(|last| last.successor().max(physical_now))?;
        Ok((now, pt.max_error_micros))
    }

    pub fn max_clock_skew_usec(&self) -> u64 {
        self.max_clock_skew_usec
    }
}

impl fmt::Debug for HybridClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HybridClock")
            .field("current", &self.current)
            .field("max_clock_skew_usec", &self.max_clock_skew_usec)
            .finish_non_exhaustive()
    }
}

impl Clock for HybridClock {
    fn now(&self) -> Result<HybridTime, ClockError> {
        self.now_with_error().map(|(now, _)| now)
    }

    fn update(&self, observed: HybridTime) -> Result<(), ClockError> {
        // Checked first so a shut-down clock reports that rather than a physical clock problem.
        self.current.load()?;
        if observed.is_valid() {
            let pt = self.physical.now()?;
            if observed.physical_micros() > pt.time_point_micros.saturating_add(self.max_clock_skew_usec) {
                warn!(
                    %observed,
                    physical_now_micros = pt.time_point_micros,
                    max_skew_usec = self.max_clock_skew_usec,
                    "refusing observed timestamp beyond maximum clock skew"
                );
                return Err(ClockError::ExceedsMaxSkew {
                    observed,
                    physical_now_micros: pt.time_point_micros,
                    max_skew_usec: self.max_clock_skew_usec,
                });
            }
        }
        if let Some(previous) = self.current.raise_to(observed)? {
            debug!(%previous, %observed, "hybrid clock raised by observed timestamp");
        }
        Ok(())
    }

    fn is_after(&self, reference: HybridTime) -> Result<bool, ClockError> {
        Ok(self.now()? > reference)
    }

    fn wait_until_after(&self, target: HybridTime, deadline: Instant) -> Result<(), ClockError> {
        self.current.load()?;
        let pt = self.physical.now()?;
        // `target` is surely past once our earliest possible true time is beyond it.
        let earliest = pt.time_point_micros.saturating_sub(pt.max_error_micros);
        if earliest > target.physical_micros() {
            return Ok(());
        }
        let required = Duration::from_micros(
            target
                .physical_micros()
                .saturating_add(pt.max_error_micros)
                .saturating_add(1)
                .saturating_sub(pt.time_point_micros),
        );
        let deadline_in = deadline.saturating_duration_since(Instant::now());
        if required > deadline_in {
            warn!(%target, ?required, ?deadline_in, "deadline too close to wait for timestamp");
            return Err(ClockError::TimedOut {
                target,
                required,
                deadline_in,
            });
        }
        debug!(%target, ?required, "waiting for timestamp to pass");
        std::thread::sleep(required);
        Ok(())
    }

    fn shutdown(&self) {
        if self.current.shut_down() {
            info!("hybrid clock shut down");
        }
    }

    fn peek(&self) -> Result<HybridTime, ClockError> {
        self.current.load()
    }
}
