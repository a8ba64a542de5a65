//! Record error types

/// Errors from constructing or decoding record fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordError {
    /// Zone order outside `Disabled..=Zone6`
    InvalidZoneOrder(u8),
    /// Watering time does not fit in 6 bits
    InvalidWateringTime(u8),
    /// Watering days do not fit in 7 bits
    InvalidWateringDays(u8),
    /// Zone name longer than the stored field
    NameTooLong,
    /// Zone name is not valid UTF-8 or contains NUL
    InvalidName,
    /// Event code is a sentinel or out of range
    InvalidEventCode(u8),
    /// Event data does not fit in 28 bits
    InvalidEventData(u32),
    /// Stored checksum does not match the sector contents
    ChecksumMismatch { stored: u32, computed: u32 },
}

impl core::fmt::Display for RecordError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RecordError::InvalidZoneOrder(v) => write!(f, "invalid zone order {}", v),
            RecordError::InvalidWateringTime(v) => write!(f, "invalid watering time {} min", v),
            RecordError::InvalidWateringDays(v) => write!(f, "invalid watering days 0x{:02x}", v),
            RecordError::NameTooLong => write!(f, "zone name too long"),
            RecordError::InvalidName => write!(f, "invalid zone name"),
            RecordError::InvalidEventCode(v) => write!(f, "invalid event code {}", v),
            RecordError::InvalidEventData(v) => write!(f, "event data 0x{:08x} exceeds 28 bits", v),
            RecordError::ChecksumMismatch { stored, computed } => write!(
                f,
                "invalid record checksum 0x{:08x}, expected 0x{:08x}",
                stored, computed
            ),
        }
    }
}
