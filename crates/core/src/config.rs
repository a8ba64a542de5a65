//! Store configuration
//!
//! Compile-time constants for the record store plus the runtime
//! [`StoreConfig`] handed to the store at construction.

/// Flash sector size (minimum erasable unit and size of one record)
pub const SECTOR_SIZE: usize = 4096;

/// Number of irrigation zones held in each record
pub const NUM_ZONES: usize = 6;

/// Sectors at the end of flash reserved for the radio/calibration subsystem
pub const RESERVED_TAIL_SECTORS: u32 = 5;

/// Maximum size of the static-file area
pub const MAX_DATA_SIZE: u32 = 128 * 1024;

/// Seconds in one calendar day
pub const SECONDS_PER_DAY: u32 = 60 * 60 * 24;

/// Sustainable write rate for the record rotation area
///
/// With a 4 MB flash the rotation area holds ~730 sectors; at 200 writes per
/// day and ~100k erase cycles per sector the flash outlasts the device.
pub const MAX_WRITES_PER_DAY: u32 = 200;

/// How often a deferred write re-checks the wall clock
pub const RETRY_POLL_INTERVAL_MS: u32 = 60_000;

/// Runtime configuration for the record store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Write-rate ceiling enforced by the rate limiter
    pub max_writes_per_day: u32,
    /// Polling interval of a deferred write, in milliseconds
    pub retry_poll_interval_ms: u32,
}

impl StoreConfig {
    /// Create a configuration with the default limits
    pub const fn new() -> Self {
        Self {
            max_writes_per_day: MAX_WRITES_PER_DAY,
            retry_poll_interval_ms: RETRY_POLL_INTERVAL_MS,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new()
    }
}
