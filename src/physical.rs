//! Physical time sources for [`HybridClock`](crate::HybridClock).
//!
//! A physical reading comes with an error bound: the source promises that true time is within
//! `max_error_micros` of `time_point_micros`. The hybrid clock uses the bound to decide how long it
//! has to wait before a timestamp is surely in the past everywhere.
use crate::error::ClockError;
use rsntp::SntpClient;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// The default NTP pool queried when no server is configured.
pub const DEFAULT_NTP_SERVER: &str = "pool.ntp.org";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicalTime {
    /// Microseconds since the Unix epoch.
    pub time_point_micros: u64,
    pub max_error_micros: u64,
}

pub trait PhysicalClock: Send + Sync {
    fn now(&self) -> Result<PhysicalTime, ClockError>;
}

/// Reads the operating system's wall clock and reports a fixed error bound.
#[derive(Debug, Clone)]
pub struct SystemPhysicalClock {
    max_error_micros: u64,
}

impl SystemPhysicalClock {
    pub fn new(max_error_micros: u64) -> Self {
        Self { max_error_micros }
    }
}

impl PhysicalClock for SystemPhysicalClock {
    fn now(&self) -> Result<PhysicalTime, ClockError> {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| ClockError::PhysicalClock(e.to_string()))?;
        Ok(PhysicalTime {
            time_point_micros: since_epoch.as_micros() as u64,
            max_error_micros: self.max_error_micros,
        })
    }
}

/// Asks an SNTP server for the time on every reading.
///
/// Each reading is a network round trip, so this is meant for clocks that are read rarely, or as a
/// reference to check a faster source against.
pub struct NtpPhysicalClock {
    client: SntpClient,
    server: String,
}

impl NtpPhysicalClock {
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            client: SntpClient::new(),
            server: server.into(),
        }
    }

    pub fn server(&self) -> &str {
        &self.server
    }
}

impl fmt::Debug for NtpPhysicalClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NtpPhysicalClock")
            .field("server", &self.server)
            .finish_non_exhaustive()
    }
}

impl Default for NtpPhysicalClock {
    fn default() -> Self {
        Self::new(DEFAULT_NTP_SERVER)
    }
}

impl PhysicalClock for NtpPhysicalClock {
    fn now(&self) -> Result<PhysicalTime, ClockError> {
        let result = self
            .client
            .synchronize(self.server.as_str())
            .map_err(|e| ClockError::PhysicalClock(e.to_string()))?;
        let since_epoch = result
            .datetime()
            .unix_timestamp()
            .map_err(|e| ClockError::PhysicalClock(e.to_string()))?;
        // The reply could have been stamped anywhere within the round trip.
        let round_trip = result
            .round_trip_delay()
            .abs_as_std_duration()
            .map_err(|e| ClockError::PhysicalClock(e.to_string()))?;
        Ok(PhysicalTime {
            time_point_micros: since_epoch.as_micros() as u64,
            max_error_micros: (round_trip / 2).as_micros() as u64,
        })
    }
}

/// A physical clock that only moves when told to. Useful for tests and deterministic simulation.
#[derive(Debug, Default)]
pub struct ManualPhysicalClock {
    micros: AtomicU64,
    max_error_micros: AtomicU64,
}

impl ManualPhysicalClock {
    pub fn new(micros: u64, max_error_micros: u64) -> Self {
        Self {
            micros: AtomicU64::new(micros),
            max_error_micros: AtomicU64::new(max_error_micros),
        }
    }

    pub fn set_micros(&self, micros: u64) {
        self.micros.store(micros, Ordering::Release);
    }

    pub fn advance_micros(&self, delta: u64) {
        self.micros.fetch_add(delta, Ordering::AcqRel);
    }

    pub fn set_max_error_micros(&self, max_error_micros: u64) {
        self.max_error_micros.store(max_error_micros, Ordering::Release);
    }
}

impl PhysicalClock for ManualPhysicalClock {
    fn now(&self) -> Result<PhysicalTime, ClockError> {
        Ok(PhysicalTime {
            time_point_micros: self.micros.load(Ordering::Acquire),
            max_error_micros: self.max_error_micros.load(Ordering::Acquire),
        })
    }
}
