//! Flash Record Store
//!
//! Persists the controller settings and a bounded event log as one
//! versioned record per flash sector, rotated across a pool of sectors so
//! that erase wear is spread evenly.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────┐
//! │        Web UI / watering scheduler      │
//! │  (settings edits, event logging)        │
//! └──────────────┬─────────────────────────┘
//!                │
//!                ▼
//! ┌────────────────────────────────────────┐
//! │        RecordStore                      │
//! │  - Cached current record                │
//! │  - Write-rate budget, deferred writes   │
//! │  - Event history across slots           │
//! └──────────────┬─────────────────────────┘
//!                │
//!                ▼
//! ┌────────────────────────────────────────┐
//! │        SectorStore                      │
//! │  (whole-sector erase/program/read)      │
//! └──────────────┬─────────────────────────┘
//!                │
//!                ▼
//! ┌────────────────────────────────────────┐
//! │        Flash Interface                  │
//! └────────────────────────────────────────┘
//! ```
//!
//! # Flash Layout (4 MB, 512 KB + 512 KB map)
//!
//! ```text
//! [Firmware]          0x000000 - 0x100000
//! [Application data]  0x100000 - 0x120000
//! [Record slot 0]     0x120000 - 0x121000 (4 KB)
//! [Record slot 1]     0x121000 - 0x122000 (4 KB)
//! ...
//! [Record slot 730]   0x3FA000 - 0x3FB000 (4 KB)
//! [Radio data]        0x3FB000 - 0x400000 (5 sectors, never touched)
//! ```
//!
//! # Record Format
//!
//! ```text
//! Offset  Size  Field
//! 0x000   4     checksum of bytes 4..4096
//! 0x004   4     id
//! 0x008   4     timestamp
//! 0x00C   4     first_timestamp
//! 0x010   12    global settings
//! 0x01C   168   zone settings (6 x 28)
//! 0x0C4   2     last log index
//! 0x0C8   3896  log entries (487 x 8)
//! ```
//!
//! # Wear Leveling
//!
//! Each save goes to the slot after the current one. The current record is
//! the one with the highest id and is found by binary search at load time,
//! so no index sector is needed.

mod error;
mod event_log;
mod locator;
mod sector;
mod store;
mod writer;

#[cfg(test)]
mod scenarios;

pub use error::{Result, SaveOutcome, StoreError};
pub use locator::{locate_current, SlotRequest};
pub use sector::SectorStore;
pub use store::{RecordStore, StoreStats};
