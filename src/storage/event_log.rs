//! Event log
//!
//! Every record carries a fixed window of [`LOG_CAPACITY`] log entries.
//! Appending an event first copies the window of the slot that is about to
//! be overwritten, then adds the new entry and saves. Since the pool is
//! written round-robin, slot `s` ends up holding every n-th event (n = pool
//! size) and the full history is the interleaving of all windows:
//!
//! ```text
//! history index i  ->  slot:  (i mod n) writes back from the current one
//!                      entry: (i div n) entries back in that slot's window
//! ```
//!
//! At most `n * LOG_CAPACITY` events are retrievable. While a write is
//! deferred, the in-memory record takes the place of the slot it will be
//! written to.

use sprinkler_core::record::{EventCode, LogEntry, EVENT_DATA_MAX, LOG_CAPACITY};
use sprinkler_core::traits::{TimeSource, WallClock};

use super::error::{Result, SaveOutcome, StoreError};
use super::locator::SlotRequest;
use super::store::RecordStore;
use crate::platform::FlashInterface;
use crate::{log_debug, log_error};

impl<F, C> RecordStore<F, C>
where
    F: FlashInterface,
    C: WallClock + TimeSource,
{
    /// Append an event and save the record
    ///
    /// The new record is built on a copy of the cached one, so a failed
    /// write leaves the cache and the history unchanged.
    ///
    /// # Errors
    ///
    /// - `InvalidData` if `data` does not fit in 28 bits
    /// - `ClockUnavailable` if the wall clock is not synchronized
    /// - any error of loading the next slot or of writing the record
    pub fn log_event(&mut self, event: EventCode, data: u32) -> Result<SaveOutcome> {
        if data > EVENT_DATA_MAX {
            return Err(StoreError::InvalidData(data));
        }

        self.current()?;

        let timestamp = self.clock.unix_timestamp();
        if timestamp == 0 {
            log_error!("Error: unable to get time from NTP");
            return Err(StoreError::ClockUnavailable);
        }

        let entry = LogEntry::new(timestamp, event, data).map_err(|_| StoreError::InvalidData(data))?;

        let mut record = self.current()?.record.clone();
        if !record.is_virgin() {
            let next = self.load_slot(SlotRequest::RelativeForward(1))?;
            record.copy_log_from(&next);
        }

        let index = record.push_log(entry);
        log_debug!("event {} data {} at log index {}", event as u8, data, index);

        self.commit(record)
    }

    /// Persist the current settings
    ///
    /// Settings edited through [`settings_mut`](Self::settings_mut) are saved
    /// with a `ConfigUpdate` event, as every record write carries one new
    /// event.
    pub fn save_settings(&mut self) -> Result<SaveOutcome> {
        self.log_event(EventCode::ConfigUpdate, 0)
    }

    /// Append an event given as a raw code
    ///
    /// Codes outside the event range, including the reserved sentinels, are
    /// rejected with `InvalidEvent` before anything is read or written.
    pub fn log_raw_event(&mut self, code: u8, data: u32) -> Result<SaveOutcome> {
        let event = EventCode::try_from(code).map_err(|_| StoreError::InvalidEvent(code))?;
        self.log_event(event, data)
    }

    /// Read logged events, most recent first
    ///
    /// Fills `out` with the events at history positions `offset`,
    /// `offset + 1`, ... where position 0 is the most recent event, and
    /// returns how many were found. History ends early, without error, at
    /// the first position no window holds.
    pub fn get_event_history(&mut self, offset: usize, out: &mut [LogEntry]) -> Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }

        let num_slots = self.num_log_sectors();
        if offset >= num_slots * LOG_CAPACITY {
            return Ok(0);
        }

        let ahead = self.current()?.ahead;

        let mut count = 0;
        for (position, dst) in out.iter_mut().enumerate() {
            let index = offset + position;
            let sector_back = index % num_slots;
            let entry_back = index / num_slots;

            let entry = if sector_back == 0 {
                self.current()?.record.log_entry_back(entry_back)
            } else {
                // A deferred record stands in for the slot after the current one
                let back = if ahead { sector_back - 1 } else { sector_back };
                self.load_slot(SlotRequest::RelativeBack(back))?
                    .log_entry_back(entry_back)
            };

            match entry {
                Some(entry) => {
                    *dst = entry;
                    count += 1;
                }
                None => break,
            }
        }

        Ok(count)
    }
}
