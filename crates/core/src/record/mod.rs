//! Record format for the flash rotation area
//!
//! A record is one versioned snapshot of the controller configuration plus
//! a window of the event log. It fills exactly one flash sector:
//!
//! ```text
//! ┌────────────────────────────────────┐
//! │ checksum: u32                      │  Offset: 0   (covers 4..4096)
//! │ id: u32                            │  Offset: 4
//! │ timestamp: u32                     │  Offset: 8
//! │ first_timestamp: u32               │  Offset: 12
//! ├────────────────────────────────────┤
//! │ last_watering: u32                 │  Offset: 16
//! │ start_time_min: u16                │  Offset: 20
//! │ moisture_threshold: u16            │  Offset: 22
//! │ enabled: u8 + 3 reserved           │  Offset: 24
//! │ zones: 6 x 28 bytes                │  Offset: 28
//! │ last_log_idx: u16 + 2 reserved     │  Offset: 196
//! ├────────────────────────────────────┤
//! │ log: 487 x 8 bytes                 │  Offset: 200
//! └────────────────────────────────────┘
//! ```
//!
//! All fields are little-endian. A sector whose `checksum` and `id` both read
//! as all ones has never been written and decodes to [`Record::blank`].

pub mod error;
pub mod log;
pub mod zone;

pub use error::RecordError;
pub use log::{BootCode, EventCode, LogEntry, EVENT_DATA_MAX};
pub use zone::{WateringDays, Weekdays, ZoneOrder, ZoneSettings};

use crate::checksum::checksum;
use crate::config::{NUM_ZONES, SECTOR_SIZE};

/// Size of the record header and settings preceding the log array
pub const HEADER_SIZE: usize = 200;

/// Number of log entries held by one record
pub const LOG_CAPACITY: usize = (SECTOR_SIZE - HEADER_SIZE) / LogEntry::SIZE;

/// `last_log_idx` value of a record that has never logged an event
pub const LOG_NONE: u16 = 0xFFFF;

/// `id` value of a never-written record
pub const ID_NONE: u32 = u32::MAX;

const ZONES_OFFSET: usize = 28;
const LAST_LOG_IDX_OFFSET: usize = ZONES_OFFSET + NUM_ZONES * ZoneSettings::SIZE;

/// Controller settings carried in every record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Wall-clock time of the last scheduled watering
    pub last_watering: u32,
    /// Scheduled start, minutes after midnight
    pub start_time_min: u16,
    /// Moisture percentage below which watering runs (0xFFFF = unused)
    pub moisture_threshold: u16,
    /// Scheduled watering enabled
    pub enabled: bool,
    /// Per-zone configuration
    pub zones: [ZoneSettings; NUM_ZONES],
}

impl Default for Settings {
    /// Settings of a controller that has never saved a record
    fn default() -> Self {
        Self {
            last_watering: 0,
            start_time_min: 0,
            moisture_threshold: 0xFFFF,
            enabled: false,
            zones: core::array::from_fn(ZoneSettings::default_for),
        }
    }
}

/// One versioned record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Write counter, [`ID_NONE`] if never written
    pub id: u32,
    /// Wall-clock time of this write
    pub timestamp: u32,
    /// Wall-clock time of the very first write
    pub first_timestamp: u32,
    /// Domain payload
    pub settings: Settings,
    last_log_idx: u16,
    log: [LogEntry; LOG_CAPACITY],
}

impl Record {
    /// Record of an unwritten rotation pool
    pub fn blank() -> Self {
        Self {
            id: ID_NONE,
            timestamp: u32::MAX,
            first_timestamp: u32::MAX,
            settings: Settings::default(),
            last_log_idx: LOG_NONE,
            log: [LogEntry::ERASED; LOG_CAPACITY],
        }
    }

    /// Whether this record has never been written to flash
    pub fn is_virgin(&self) -> bool {
        self.id == ID_NONE
    }

    /// Index of the most recent log entry, if any was logged
    pub fn last_log_index(&self) -> Option<usize> {
        let idx = usize::from(self.last_log_idx);
        (idx < LOG_CAPACITY).then_some(idx)
    }

    /// Log entry at a raw array index
    pub fn log_entry(&self, index: usize) -> Option<&LogEntry> {
        self.log.get(index)
    }

    /// Append an entry to the log window, overwriting the oldest slot
    ///
    /// Returns the array index the entry was stored at.
    pub fn push_log(&mut self, entry: LogEntry) -> usize {
        let idx = match self.last_log_index() {
            Some(last) if last + 1 < LOG_CAPACITY => last + 1,
            _ => 0,
        };
        self.log[idx] = entry;
        self.last_log_idx = idx as u16;
        idx
    }

    /// Replace the log window with the one carried by `other`
    pub fn copy_log_from(&mut self, other: &Record) {
        self.log = other.log;
        self.last_log_idx = other.last_log_idx;
    }

    /// Entry `depth` positions before the most recent one in this window
    ///
    /// Returns `None` when the window has no entry that deep: nothing was
    /// logged, `depth` exceeds the capacity, or the slot holds no event.
    pub fn log_entry_back(&self, depth: usize) -> Option<LogEntry> {
        let last = self.last_log_index()?;
        if depth >= LOG_CAPACITY {
            return None;
        }

        let idx = (last + LOG_CAPACITY - depth) % LOG_CAPACITY;
        let entry = self.log[idx];
        entry.is_valid().then_some(entry)
    }

    /// Serialize the record into a sector buffer, checksum included
    pub fn encode(&self, buf: &mut [u8; SECTOR_SIZE]) {
        buf.fill(0);

        buf[4..8].copy_from_slice(&self.id.to_le_bytes());
        buf[8..12].copy_from_slice(&self.timestamp.to_le_bytes());
        buf[12..16].copy_from_slice(&self.first_timestamp.to_le_bytes());

        let s = &self.settings;
        buf[16..20].copy_from_slice(&s.last_watering.to_le_bytes());
        buf[20..22].copy_from_slice(&s.start_time_min.to_le_bytes());
        buf[22..24].copy_from_slice(&s.moisture_threshold.to_le_bytes());
        buf[24] = u8::from(s.enabled);

        for (i, zone) in s.zones.iter().enumerate() {
            let offset = ZONES_OFFSET + i * ZoneSettings::SIZE;
            buf[offset..offset + ZoneSettings::SIZE].copy_from_slice(&zone.to_bytes());
        }

        buf[LAST_LOG_IDX_OFFSET..LAST_LOG_IDX_OFFSET + 2].copy_from_slice(&self.last_log_idx.to_le_bytes());

        for (i, entry) in self.log.iter().enumerate() {
            let offset = HEADER_SIZE + i * LogEntry::SIZE;
            buf[offset..offset + LogEntry::SIZE].copy_from_slice(&entry.to_bytes());
        }

        let sum = checksum(&buf[4..]);
        buf[0..4].copy_from_slice(&sum.to_le_bytes());
    }

    /// Deserialize and validate a sector buffer
    ///
    /// A never-written sector yields [`Record::blank`]. Any other sector must
    /// carry a matching checksum and in-range fields.
    pub fn decode(buf: &[u8; SECTOR_SIZE]) -> Result<Self, RecordError> {
        let stored = read_u32(buf, 0);
        let id = read_u32(buf, 4);

        if stored == u32::MAX && id == ID_NONE {
            return Ok(Self::blank());
        }

        let computed = checksum(&buf[4..]);
        if stored != computed {
            return Err(RecordError::ChecksumMismatch { stored, computed });
        }

        let mut zones = core::array::from_fn(ZoneSettings::default_for);
        for (i, zone) in zones.iter_mut().enumerate() {
            let offset = ZONES_OFFSET + i * ZoneSettings::SIZE;
            let mut raw = [0u8; ZoneSettings::SIZE];
            raw.copy_from_slice(&buf[offset..offset + ZoneSettings::SIZE]);
            *zone = ZoneSettings::from_bytes(&raw)?;
        }

        let mut log = [LogEntry::ERASED; LOG_CAPACITY];
        for (i, entry) in log.iter_mut().enumerate() {
            let offset = HEADER_SIZE + i * LogEntry::SIZE;
            let mut raw = [0u8; LogEntry::SIZE];
            raw.copy_from_slice(&buf[offset..offset + LogEntry::SIZE]);
            *entry = LogEntry::from_bytes(&raw);
        }

        Ok(Self {
            id,
            timestamp: read_u32(buf, 8),
            first_timestamp: read_u32(buf, 12),
            settings: Settings {
                last_watering: read_u32(buf, 16),
                start_time_min: u16::from_le_bytes([buf[20], buf[21]]),
                moisture_threshold: u16::from_le_bytes([buf[22], buf[23]]),
                enabled: buf[24] != 0,
                zones,
            },
            last_log_idx: u16::from_le_bytes([buf[LAST_LOG_IDX_OFFSET], buf[LAST_LOG_IDX_OFFSET + 1]]),
            log,
        })
    }
}

fn read_u32(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]])
}
