//! Wear-leveling writer
//!
//! Each save writes the whole record to the slot after the current one,
//! wrapping to the start of the pool, so every slot is erased once per
//! pool rotation. Saves that would exceed the write-rate budget are held
//! back until the next calendar day and retried from [`RecordStore::poll`].

use sprinkler_core::rate::{next_day_start, writing_too_fast};
use sprinkler_core::record::{Record, ID_NONE};
use sprinkler_core::traits::{TimeSource, WallClock};

use super::error::{Result, SaveOutcome, StoreError};
use super::locator::SlotRequest;
use super::store::{PendingWrite, RecordStore, StoreTask, WrittenHeader};
use crate::platform::FlashInterface;
use crate::{log_debug, log_error, log_info, log_warn};

impl<F, C> RecordStore<F, C>
where
    F: FlashInterface,
    C: WallClock + TimeSource,
{
    /// Persist the in-memory record as it is
    ///
    /// Public callers persist through [`log_event`](Self::log_event) or
    /// [`save_settings`](Self::save_settings), which add the event that
    /// keeps each slot's log window one entry ahead of the slot it replaces.
    pub(crate) fn save(&mut self) -> Result<SaveOutcome> {
        let record = self.current()?.record.clone();
        self.commit(record)
    }

    /// Stamp `record` and write it to the next slot
    ///
    /// Stamps the record with the next id and the wall-clock time. When the
    /// write-rate budget is exceeded the write is deferred and
    /// `Ok(SaveOutcome::Deferred)` is returned; only one deferred write is
    /// pending at a time.
    ///
    /// The cached record is replaced once `record` is on flash, or when the
    /// write is deferred so that the retry persists it. A failed write leaves
    /// the cache untouched.
    ///
    /// # Errors
    ///
    /// - `ClockUnavailable` if the wall clock is unknown and no record was
    ///   ever written with a valid time
    /// - `Io` if the erase or write fails
    pub(crate) fn commit(&mut self, mut record: Record) -> Result<SaveOutcome> {
        self.current()?;

        let timestamp = self.clock.unix_timestamp();
        let last = self.last_written;

        if timestamp == 0 && last.timestamp == 0 {
            log_error!("Error: unable to get time from NTP");
            return Err(StoreError::ClockUnavailable);
        }

        let first_timestamp = if last.first_timestamp != 0 {
            last.first_timestamp
        } else {
            timestamp
        };
        let id = last.id.wrapping_add(1);

        record.id = id;
        record.first_timestamp = first_timestamp;
        record.timestamp = timestamp;

        let too_fast = timestamp != 0
            && writing_too_fast(timestamp, first_timestamp, id, self.config.max_writes_per_day);

        if too_fast || id == ID_NONE {
            let loaded = self.current()?;
            loaded.record = record;
            loaded.ahead = true;
            return self.defer(timestamp);
        }

        self.write_next(record)
    }

    /// Run due deferred work
    ///
    /// Call once per host event-loop tick. Returns the outcome of a deferred
    /// write performed during this call, if any. A deferred write that fails
    /// stays pending and is retried on the next poll interval.
    pub fn poll(&mut self) -> Result<Option<SaveOutcome>> {
        let Some((task, StoreTask::DeferredWrite)) = self.tasks.poll_due(self.clock.now_ms()) else {
            return Ok(None);
        };

        let Some(pending) = self.pending.filter(|p| p.task == task) else {
            self.tasks.cancel(task);
            return Ok(None);
        };

        let timestamp = self.clock.unix_timestamp();
        if timestamp == 0 || timestamp < pending.not_before {
            return Ok(None);
        }

        let last = self.last_written;
        let id = last.id.wrapping_add(1);
        if id == ID_NONE {
            log_error!("Error: record ids exhausted, write stays deferred");
            return Ok(None);
        }

        let mut record = self.current()?.record.clone();
        record.id = id;
        record.first_timestamp = last.first_timestamp;
        record.timestamp = timestamp;

        log_info!("deferred record write at {}", timestamp);
        self.write_next(record).map(Some)
    }

    /// Drop a pending deferred write
    ///
    /// Returns `false` if no write was pending. The in-memory record keeps
    /// its changes and is persisted by the next successful save.
    pub fn cancel_pending_write(&mut self) -> bool {
        match self.pending.take() {
            Some(pending) => {
                self.tasks.cancel(pending.task);
                log_debug!("cancelled deferred write (not before {})", pending.not_before);
                true
            }
            None => false,
        }
    }

    /// Hold the current record back until the next calendar day
    fn defer(&mut self, timestamp: u32) -> Result<SaveOutcome> {
        self.stats.deferred_saves += 1;

        if let Some(pending) = self.pending {
            return Ok(SaveOutcome::Deferred {
                not_before: pending.not_before,
            });
        }

        let not_before = next_day_start(timestamp);
        let task = self.tasks.schedule(
            StoreTask::DeferredWrite,
            self.clock.now_ms(),
            self.config.retry_poll_interval_ms,
        )?;
        self.pending = Some(PendingWrite { task, not_before });

        log_warn!("writing too fast, record write deferred until {}", not_before);
        Ok(SaveOutcome::Deferred { not_before })
    }

    /// Write `record` to the slot after the current one and make it current
    fn write_next(&mut self, record: Record) -> Result<SaveOutcome> {
        let num_slots = self.num_log_sectors();
        let current_slot = self.current()?.slot;

        let slot = SlotRequest::RelativeForward(1).resolve(current_slot, num_slots);
        let address = self.sectors.layout().slot_address(slot);

        self.sectors.store_record(address, &record)?;

        // Written directly or by the retry, nothing is left pending
        self.cancel_pending_write();

        let id = record.id;
        self.last_written = WrittenHeader::of(&record);
        self.stats.total_writes += 1;
        self.stats.current_slot = Some(slot);

        let loaded = self.current()?;
        loaded.slot = slot;
        loaded.record = record;
        loaded.ahead = false;

        Ok(SaveOutcome::Written { slot, id })
    }
}
