//! Event log entries
//!
//! Each record embeds a fixed-capacity array of 8-byte log entries:
//!
//! ```text
//! ┌──────────────────────────────┐
//! │ Timestamp: u32 (LE)          │  Offset: 0
//! ├──────────────────────────────┤
//! │ Code: 4 bits | Data: 28 bits │  Offset: 4 (u32 LE, code in low bits)
//! └──────────────────────────────┘
//! ```
//!
//! An erased entry reads back as all ones: timestamp `0xFFFFFFFF`, code 15.

use super::error::RecordError;

/// Smallest event code value, reserved as "not an event"
pub const EVENT_CODE_ZERO: u8 = 0;

/// First event code value past the valid range, reserved as "not an event"
pub const EVENT_CODE_INVALID: u8 = 8;

/// Number of bits used by the event code
pub const EVENT_CODE_BITS: u32 = 4;

/// Largest value storable in the data field
pub const EVENT_DATA_MAX: u32 = (1 << (32 - EVENT_CODE_BITS)) - 1;

const EVENT_CODE_MASK: u32 = (1 << EVENT_CODE_BITS) - 1;

/// Operational event recorded in the log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EventCode {
    /// Configuration changed, no data
    ConfigUpdate = 1,
    /// Scheduled watering started, data is zone index
    AutoStart = 2,
    /// Scheduled watering ended, data is zone index
    AutoEnd = 3,
    /// Manual watering started, data is zone index
    ManualStart = 4,
    /// Manual watering ended, data is zone index
    ManualEnd = 5,
    /// Device booted, data is a [`BootCode`]
    Boot = 6,
    /// Moisture sensor reading, data is percentage
    Moisture = 7,
}

impl TryFrom<u8> for EventCode {
    type Error = RecordError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(EventCode::ConfigUpdate),
            2 => Ok(EventCode::AutoStart),
            3 => Ok(EventCode::AutoEnd),
            4 => Ok(EventCode::ManualStart),
            5 => Ok(EventCode::ManualEnd),
            6 => Ok(EventCode::Boot),
            7 => Ok(EventCode::Moisture),
            _ => Err(RecordError::InvalidEventCode(code)),
        }
    }
}

/// Reason for the last reset, logged with [`EventCode::Boot`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BootCode {
    PowerOn = 0,
    Watchdog = 1,
    Exception = 2,
    SoftWatchdog = 3,
    SoftReset = 4,
    DeepSleepAwake = 5,
    ExtReset = 6,
}

impl TryFrom<u32> for BootCode {
    type Error = RecordError;

    fn try_from(data: u32) -> Result<Self, Self::Error> {
        match data {
            0 => Ok(BootCode::PowerOn),
            1 => Ok(BootCode::Watchdog),
            2 => Ok(BootCode::Exception),
            3 => Ok(BootCode::SoftWatchdog),
            4 => Ok(BootCode::SoftReset),
            5 => Ok(BootCode::DeepSleepAwake),
            6 => Ok(BootCode::ExtReset),
            _ => Err(RecordError::InvalidEventData(data)),
        }
    }
}

/// One log entry as stored in a record
///
/// The code is kept raw so that erased and never-written entries survive a
/// decode/encode cycle unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogEntry {
    timestamp: u32,
    code: u8,
    data: u32,
}

impl LogEntry {
    /// Size of an entry in bytes
    pub const SIZE: usize = 8;

    /// Entry as read from erased flash
    pub const ERASED: Self = Self {
        timestamp: u32::MAX,
        code: EVENT_CODE_MASK as u8,
        data: EVENT_DATA_MAX,
    };

    /// Create a new entry
    ///
    /// Fails if `data` does not fit in 28 bits.
    pub fn new(timestamp: u32, event: EventCode, data: u32) -> Result<Self, RecordError> {
        if data > EVENT_DATA_MAX {
            return Err(RecordError::InvalidEventData(data));
        }
        Ok(Self {
            timestamp,
            code: event as u8,
            data,
        })
    }

    /// Wall-clock time of the event
    pub fn timestamp(&self) -> u32 {
        self.timestamp
    }

    /// Raw 4-bit event code
    pub fn code(&self) -> u8 {
        self.code
    }

    /// Event code, or `None` for sentinel/out-of-range codes
    pub fn event(&self) -> Option<EventCode> {
        EventCode::try_from(self.code).ok()
    }

    /// Event data (28 bits)
    pub fn data(&self) -> u32 {
        self.data
    }

    /// Whether this entry holds a real event
    pub fn is_valid(&self) -> bool {
        self.timestamp != u32::MAX && self.event().is_some()
    }

    /// Serialize entry to bytes (little-endian)
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let packed = (u32::from(self.code) & EVENT_CODE_MASK) | (self.data << EVENT_CODE_BITS);

        let mut buf = [0u8; Self::SIZE];
        buf[0..4].copy_from_slice(&self.timestamp.to_le_bytes());
        buf[4..8].copy_from_slice(&packed.to_le_bytes());
        buf
    }

    /// Deserialize entry from bytes (little-endian)
    pub fn from_bytes(buf: &[u8; Self::SIZE]) -> Self {
        let timestamp = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
        let packed = u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);

        Self {
            timestamp,
            code: (packed & EVENT_CODE_MASK) as u8,
            data: packed >> EVENT_CODE_BITS,
        }
    }
}
