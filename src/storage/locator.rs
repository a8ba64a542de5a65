//! Record locator
//!
//! The rotation pool is written round-robin, so the record ids read slot by
//! slot form a rotated ascending run: newer records after the wrap point,
//! older ones before, unwritten slots at the end of a pool that never
//! wrapped. The current record sits right before the discontinuity and is
//! found with a binary search that reads O(log n) sectors.
//!
//! Every probe validates the sector checksum; a corrupt probe fails the
//! whole search.

use sprinkler_core::record::Record;
use sprinkler_core::traits::{TimeSource, WallClock};

use super::error::Result;
use super::sector::SectorStore;
use super::store::{Loaded, RecordStore, WrittenHeader};
use crate::platform::FlashInterface;
use crate::{log_debug, log_info};

/// Slot addressing relative to the current record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlotRequest {
    /// The current record
    Current,
    /// The slot written `n` writes before the current one
    RelativeBack(usize),
    /// The slot `n` writes ahead of the current one (1 = next to be overwritten)
    RelativeForward(usize),
}

impl SlotRequest {
    /// Physical slot for this request in a pool of `num_slots`
    pub fn resolve(self, current: usize, num_slots: usize) -> usize {
        match self {
            SlotRequest::Current => current,
            SlotRequest::RelativeBack(n) => (current + num_slots - n % num_slots) % num_slots,
            SlotRequest::RelativeForward(n) => (current + n % num_slots) % num_slots,
        }
    }
}

/// Find the slot holding the record with the highest id
///
/// Returns the slot and its record. An unwritten pool (first slot virgin)
/// yields the last slot and a blank record, so that the next write targets
/// the first slot.
pub fn locate_current<F: FlashInterface>(sectors: &mut SectorStore<F>) -> Result<(usize, Record)> {
    let layout = *sectors.layout();
    let num_slots = layout.num_log_sectors();

    let mut low = 0;
    let mut low_rec = sectors.load_record(layout.slot_address(low))?;

    if low_rec.is_virgin() {
        // First entry will be saved at the first slot
        return Ok((num_slots - 1, low_rec));
    }

    let mut high = num_slots - 1;
    if high == low {
        return Ok((low, low_rec));
    }
    let mut high_rec = sectors.load_record(layout.slot_address(high))?;

    while low < high {
        if !high_rec.is_virgin() && high_rec.id > low_rec.id {
            low = high;
            low_rec = high_rec;
            break;
        }

        if low + 1 == high {
            break;
        }

        let mid = (low + high) / 2;
        let mid_rec = sectors.load_record(layout.slot_address(mid))?;

        if mid_rec.is_virgin() || mid_rec.id < low_rec.id {
            high = mid;
            high_rec = mid_rec;
        } else {
            low = mid;
            low_rec = mid_rec;
        }
    }

    Ok((low, low_rec))
}

impl<F, C> RecordStore<F, C>
where
    F: FlashInterface,
    C: WallClock + TimeSource,
{
    /// Locate and cache the current record
    ///
    /// Returns immediately if the record is already cached.
    pub fn load(&mut self) -> Result<&Record> {
        if self.loaded.is_none() {
            let (slot, record) = locate_current(&mut self.sectors)?;

            if record.is_virgin() {
                log_info!("record area empty, {} slots", self.num_log_sectors());
                self.last_written = WrittenHeader::NONE;
                self.stats.current_slot = None;
            } else {
                log_info!("current record id {} in slot {}", record.id, slot);
                self.last_written = WrittenHeader::of(&record);
                self.stats.current_slot = Some(slot);
            }

            self.loaded = Some(Loaded {
                slot,
                record,
                ahead: false,
            });
        }

        self.record()
    }

    /// Load a record relative to the current one
    ///
    /// Relative loads read the sector without disturbing the cached current
    /// record. [`SlotRequest::Current`] returns a copy of the cached record.
    pub fn load_slot(&mut self, request: SlotRequest) -> Result<Record> {
        let num_slots = self.num_log_sectors();
        let current = self.current()?;

        if request == SlotRequest::Current {
            return Ok(current.record.clone());
        }

        let slot = request.resolve(current.slot, num_slots);
        log_debug!("load slot {} ({:?})", slot, request);
        let address = self.sectors.layout().slot_address(slot);
        self.sectors.load_record(address)
    }
}
