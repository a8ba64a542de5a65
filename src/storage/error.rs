//! Record store errors and save outcomes

use core::fmt;

use sprinkler_core::layout::LayoutError;
use sprinkler_core::record::RecordError;
use sprinkler_core::scheduler::SchedulerError;

use crate::platform::PlatformError;

/// Result type for record store operations
pub type Result<T> = core::result::Result<T, StoreError>;

/// Record store errors
///
/// A rate-limited save is not an error; it returns
/// [`SaveOutcome::Deferred`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Flash erase/write/read failed
    Io(PlatformError),
    /// Checksum mismatch on a sector expected to hold a record
    Corrupt { address: u32, stored: u32, computed: u32 },
    /// Checksum is valid but a field is out of range
    InvalidRecord { address: u32 },
    /// Wall clock not synchronized
    ClockUnavailable,
    /// Event code outside the valid range
    InvalidEvent(u8),
    /// Event data does not fit in 28 bits
    InvalidData(u32),
    /// Record rotation area is missing or exceeds the flash
    AreaUnavailable,
    /// Flash layout could not be derived
    Layout,
    /// Deferred write could not be scheduled
    Scheduler,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "I/O error: {}", e),
            StoreError::Corrupt {
                address,
                stored,
                computed,
            } => write!(
                f,
                "corrupt record at 0x{:08x}: checksum 0x{:08x}, expected 0x{:08x}",
                address, stored, computed
            ),
            StoreError::InvalidRecord { address } => write!(f, "invalid record at 0x{:08x}", address),
            StoreError::ClockUnavailable => write!(f, "wall clock not synchronized"),
            StoreError::InvalidEvent(code) => write!(f, "invalid event code {}", code),
            StoreError::InvalidData(data) => write!(f, "event data 0x{:08x} exceeds 28 bits", data),
            StoreError::AreaUnavailable => write!(f, "record area not available"),
            StoreError::Layout => write!(f, "unsupported flash layout"),
            StoreError::Scheduler => write!(f, "deferred write queue full"),
        }
    }
}

impl From<PlatformError> for StoreError {
    fn from(error: PlatformError) -> Self {
        StoreError::Io(error)
    }
}

impl From<LayoutError> for StoreError {
    fn from(_: LayoutError) -> Self {
        StoreError::Layout
    }
}

impl From<SchedulerError> for StoreError {
    fn from(_: SchedulerError) -> Self {
        StoreError::Scheduler
    }
}

impl StoreError {
    /// Map a record decode error for the sector at `address`
    pub fn from_record(address: u32, error: RecordError) -> Self {
        match error {
            RecordError::ChecksumMismatch { stored, computed } => StoreError::Corrupt {
                address,
                stored,
                computed,
            },
            RecordError::InvalidEventCode(code) => StoreError::InvalidEvent(code),
            RecordError::InvalidEventData(data) => StoreError::InvalidData(data),
            _ => StoreError::InvalidRecord { address },
        }
    }
}

/// Result of a save request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SaveOutcome {
    /// Record persisted to `slot` with `id`
    Written { slot: usize, id: u32 },
    /// Write-rate budget exceeded; the record is written once the wall
    /// clock reaches `not_before`
    Deferred { not_before: u32 },
}
