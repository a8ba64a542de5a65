//! Record store handle
//!
//! [`RecordStore`] owns everything the store keeps between calls: the
//! cached current record and its slot, the header of the last record
//! actually written, the pending deferred write and the statistics. The
//! operations live next to their concerns:
//!
//! - [`locator`](super::locator): finding the current record
//! - [`writer`](super::writer): wear-leveled, rate-limited saves
//! - [`event_log`](super::event_log): appending and reading events

use sprinkler_core::config::StoreConfig;
use sprinkler_core::layout::{FlashLayout, FlashSizeMap};
use sprinkler_core::record::{Record, Settings, ID_NONE};
use sprinkler_core::scheduler::{DeferredQueue, TaskId};
use sprinkler_core::traits::{TimeSource, WallClock};

use super::error::Result;
use super::sector::SectorStore;
use crate::platform::FlashInterface;

/// Work queued on the deferred-task queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StoreTask {
    /// Persist the in-memory record once the wall clock allows
    DeferredWrite,
}

/// A save held back by the write-rate budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PendingWrite {
    pub task: TaskId,
    pub not_before: u32,
}

/// Header fields of the most recently written record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WrittenHeader {
    pub id: u32,
    pub timestamp: u32,
    pub first_timestamp: u32,
}

impl WrittenHeader {
    /// Nothing written yet
    pub const NONE: Self = Self {
        id: ID_NONE,
        timestamp: 0,
        first_timestamp: 0,
    };

    pub fn of(record: &Record) -> Self {
        Self {
            id: record.id,
            timestamp: record.timestamp,
            first_timestamp: record.first_timestamp,
        }
    }
}

/// Current record and the slot it was loaded from
pub(crate) struct Loaded {
    /// Slot of the current record; the last slot for an unwritten pool so
    /// that the first write lands on slot 0
    pub slot: usize,
    pub record: Record,
    /// `record` is a deferred write that will land in the slot after `slot`
    pub ahead: bool,
}

/// Store statistics for wear leveling monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreStats {
    /// Records written since the store was opened
    pub total_writes: u32,
    /// Saves held back by the write-rate budget
    pub deferred_saves: u32,
    /// Slot of the current record, `None` while the pool is unwritten
    pub current_slot: Option<usize>,
}

/// Flash record store
///
/// Manages the configuration record and event log with:
/// - Sector rotation across the whole rotation area (wear leveling)
/// - Checksum validation of every loaded sector
/// - Id-ordered binary search for the current record
/// - Write-rate budget with deferred retries
///
/// The record is loaded lazily on first access and cached afterwards.
///
/// # Example
///
/// ```ignore
/// use sprinkler_core::config::StoreConfig;
/// use sprinkler_core::layout::{FlashLayout, FlashSizeMap};
/// use sprinkler_core::record::EventCode;
/// use sprinkler_core::traits::MockClock;
/// use sprinkler_store::platform::mock::MockFlash;
/// use sprinkler_store::storage::RecordStore;
///
/// let layout = FlashLayout::from_size_map(FlashSizeMap::Size32MMap512_512).unwrap();
/// let clock = MockClock::with_timestamp(1_700_000_000);
/// let mut store = RecordStore::new(MockFlash::new(), clock, layout, StoreConfig::default()).unwrap();
///
/// store.log_event(EventCode::ConfigUpdate, 0).unwrap();
///
/// let mut history = [sprinkler_core::record::LogEntry::ERASED; 4];
/// assert_eq!(store.get_event_history(0, &mut history).unwrap(), 1);
/// ```
pub struct RecordStore<F: FlashInterface, C> {
    pub(crate) sectors: SectorStore<F>,
    pub(crate) clock: C,
    pub(crate) config: StoreConfig,
    pub(crate) loaded: Option<Loaded>,
    pub(crate) last_written: WrittenHeader,
    pub(crate) tasks: DeferredQueue<StoreTask, 1>,
    pub(crate) pending: Option<PendingWrite>,
    pub(crate) stats: StoreStats,
}

impl<F, C> RecordStore<F, C>
where
    F: FlashInterface,
    C: WallClock + TimeSource,
{
    /// Open a store on `flash` using the rotation area of `layout`
    ///
    /// Nothing is read until the first operation that needs the record.
    pub fn new(flash: F, clock: C, layout: FlashLayout, config: StoreConfig) -> Result<Self> {
        Ok(Self {
            sectors: SectorStore::new(flash, layout)?,
            clock,
            config,
            loaded: None,
            last_written: WrittenHeader::NONE,
            tasks: DeferredQueue::new(),
            pending: None,
            stats: StoreStats::default(),
        })
    }

    /// Open a store with the layout detected from the flash size map
    pub fn from_size_map(flash: F, clock: C, map: FlashSizeMap, config: StoreConfig) -> Result<Self> {
        let layout = FlashLayout::from_size_map(map)?;
        Self::new(flash, clock, layout, config)
    }

    /// Current record, loading it on first access
    pub fn record(&mut self) -> Result<&Record> {
        Ok(&self.current()?.record)
    }

    /// Current settings
    pub fn settings(&mut self) -> Result<&Settings> {
        Ok(&self.current()?.record.settings)
    }

    /// Mutable settings
    ///
    /// Changes are persisted by [`save_settings`](Self::save_settings) or
    /// together with the next logged event.
    pub fn settings_mut(&mut self) -> Result<&mut Settings> {
        Ok(&mut self.current()?.record.settings)
    }

    /// Number of slots in the rotation pool
    pub fn num_log_sectors(&self) -> usize {
        self.sectors.layout().num_log_sectors()
    }

    /// Flash address of a rotation slot (for wear queries)
    pub fn slot_address(&self, slot: usize) -> u32 {
        self.sectors.layout().slot_address(slot)
    }

    /// Flash area layout
    pub fn layout(&self) -> &FlashLayout {
        self.sectors.layout()
    }

    /// Get store statistics
    pub fn stats(&self) -> StoreStats {
        self.stats
    }

    /// Wall clock time a deferred write is waiting for, if any
    pub fn pending_write(&self) -> Option<u32> {
        self.pending.map(|p| p.not_before)
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Get Flash interface reference
    pub fn flash(&self) -> &F {
        self.sectors.flash()
    }

    /// Get Flash interface reference (for testing)
    pub fn flash_mut(&mut self) -> &mut F {
        self.sectors.flash_mut()
    }

    /// Release the flash device and clock, dropping every cached state
    pub fn into_parts(self) -> (F, C) {
        (self.sectors.into_flash(), self.clock)
    }

    /// Loaded state, loading it on first access
    pub(crate) fn current(&mut self) -> Result<&mut Loaded> {
        if self.loaded.is_none() {
            self.load()?;
        }
        match self.loaded.as_mut() {
            Some(loaded) => Ok(loaded),
            None => Err(super::error::StoreError::AreaUnavailable),
        }
    }
}
