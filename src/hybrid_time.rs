//! The timestamp value handed out by every clock in this crate.
//!
//! A `HybridTime` is an opaque 64-bit causal marker. Logical clocks treat it as a plain counter;
//! hybrid clocks split it into a physical part (microseconds since the Unix epoch) in the high bits
//! and a logical counter in the low `BITS_FOR_LOGICAL_COMPONENT` bits, so that both kinds of value
//! live in one total order and compare with a single integer comparison.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of low bits reserved for the logical counter of a hybrid timestamp. 12 bits leaves 4096
/// events per microsecond before the logical part spills into the physical part, which is fine
/// since the spill still preserves ordering.
pub const BITS_FOR_LOGICAL_COMPONENT: u32 = 12;

const LOGICAL_BITS_MASK: u64 = (1 << BITS_FOR_LOGICAL_COMPONENT) - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HybridTime(u64);

impl HybridTime {
    pub const MIN: HybridTime = HybridTime(0);
    /// The first valid value and the usual starting point of a clock.
    pub const INITIAL: HybridTime = HybridTime(1);
    pub const MAX: HybridTime = HybridTime(u64::MAX - 1);
    /// Never issued by a clock. Clocks store it internally to mark that they were shut down.
    pub const INVALID: HybridTime = HybridTime(u64::MAX);

    #[inline]
    pub const fn new(value: u64) -> Self {
        HybridTime(value)
    }

    /// Packs a physical time in microseconds and a logical counter into one timestamp.
    pub const fn from_micros_and_logical(micros: u64, logical: u64) -> Self {
        HybridTime((micros << BITS_FOR_LOGICAL_COMPONENT) + (logical & LOGICAL_BITS_MASK))
    }

    #[inline]
    pub const fn value(self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != Self::INVALID.0
    }

    pub const fn physical_micros(self) -> u64 {
        self.0 >> BITS_FOR_LOGICAL_COMPONENT
    }

    pub const fn logical_value(self) -> u64 {
        self.0 & LOGICAL_BITS_MASK
    }

    /// Returns the next timestamp in the total order.
    ///
    /// # Panics
    /// If `self` is already [`HybridTime::MAX`]. Wrapping around would hand out a value that
    /// orders before everything issued so far, so there is no way to continue safely.
    pub fn successor(self) -> Self {
        if self.0 >= Self::MAX.0 {
            panic!("hybrid time overflow: no successor for {self}");
        }
        HybridTime(self.0 + 1)
    }
}

impl Default for HybridTime {
    fn default() -> Self {
        Self::INITIAL
    }
}

impl From<u64> for HybridTime {
    fn from(value: u64) -> Self {
        HybridTime(value)
    }
}

impl From<HybridTime> for u64 {
    fn from(value: HybridTime) -> u64 {
        value.0
    }
}

impl fmt::Display for HybridTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::INVALID => write!(f, "<invalid>"),
            Self::MAX => write!(f, "<max>"),
            _ => write!(f, "{}", self.0),
        }
    }
}
