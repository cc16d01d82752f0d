//! Configuration for building the process-wide clock.
//!
//! ```toml
//! mode = "hybrid"
//! initial_value = 1
//! max_clock_skew_usec = 500000
//!
//! [physical]
//! source = "ntp"
//! server = "time.example.com"
//! ```
use crate::error::ClockError;
use crate::hybrid_clock::HybridClock;
use crate::hybrid_time::HybridTime;
use crate::logical_clock::LogicalClock;
use crate::physical::{DEFAULT_NTP_SERVER, NtpPhysicalClock, PhysicalClock, SystemPhysicalClock};
use crate::ClockHandle;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockMode {
    #[default]
    Logical,
    Hybrid,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum PhysicalSource {
    System {
        #[serde(default = "default_max_error_usec")]
        max_error_usec: u64,
    },
    Ntp {
        #[serde(default = "default_ntp_server")]
        server: String,
    },
}

impl Default for PhysicalSource {
    fn default() -> Self {
        PhysicalSource::System {
            max_error_usec: default_max_error_usec(),
        }
    }
}

impl PhysicalSource {
    fn build(&self) -> Arc<dyn PhysicalClock> {
        match self {
            PhysicalSource::System { max_error_usec } => {
                Arc::new(SystemPhysicalClock::new(*max_error_usec))
            }
            PhysicalSource::Ntp { server } => Arc::new(NtpPhysicalClock::new(server.clone())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    pub mode: ClockMode,
    /// Value the clock starts from. A restarted process that persisted its last timestamp can
    /// resume after it.
    pub initial_value: HybridTime,
    /// Only used in hybrid mode.
    pub max_clock_skew_usec: u64,
    /// Only used in hybrid mode.
    pub physical: PhysicalSource,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            mode: ClockMode::default(),
            initial_value: HybridTime::INITIAL,
            max_clock_skew_usec: 500_000,
            physical: PhysicalSource::default(),
        }
    }
}

impl ClockConfig {
    pub fn build(&self) -> Result<ClockHandle, ClockError> {
        info!(mode = ?self.mode, "building clock from configuration");
        let clock: ClockHandle = match self.mode {
            ClockMode::Logical => LogicalClock::create_starting_at(self.initial_value)?,
            ClockMode::Hybrid => HybridClock::create_starting_at(
                self.initial_value,
                self.physical.build(),
                self.max_clock_skew_usec,
            )?,
        };
        Ok(clock)
    }
}

fn default_max_error_usec() -> u64 {
    1_000
}

fn default_ntp_server() -> String {
    DEFAULT_NTP_SERVER.to_string()
}
