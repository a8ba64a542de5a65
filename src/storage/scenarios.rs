//! End-to-end scenarios for the record store
//!
//! Each scenario drives a [`RecordStore`] on a [`MockFlash`] and reopens it
//! from the same flash contents to simulate a reboot.

use sprinkler_core::config::{StoreConfig, SECONDS_PER_DAY};
use sprinkler_core::layout::{FlashLayout, FlashSizeMap};
use sprinkler_core::record::{
    EventCode, LogEntry, WateringDays, Weekdays, ZoneOrder, ZoneSettings, LOG_CAPACITY,
};
use sprinkler_core::traits::{MockClock, WallClock};

use super::error::{SaveOutcome, StoreError};
use super::locator::SlotRequest;
use super::store::RecordStore;
use crate::platform::mock::MockFlash;

const BEGIN: u32 = 0x10_0000;

type TestStore = RecordStore<MockFlash, MockClock>;

fn small_layout(num_slots: u32) -> FlashLayout {
    FlashLayout::with_log_area(0x40_0000, BEGIN, BEGIN + num_slots * 0x1000).unwrap()
}

fn open_small(num_slots: u32, clock: MockClock) -> TestStore {
    RecordStore::new(MockFlash::new(), clock, small_layout(num_slots), StoreConfig::default()).unwrap()
}

/// Drop every cached state and reopen on the same flash
fn reboot(store: TestStore) -> TestStore {
    let layout = *store.layout();
    let (flash, clock) = store.into_parts();
    RecordStore::new(flash, clock, layout, StoreConfig::default()).unwrap()
}

#[test]
fn test_config_update_history_across_reboot() {
    let mut store = RecordStore::from_size_map(
        MockFlash::new(),
        MockClock::new(),
        FlashSizeMap::Size32MMap512_512,
        StoreConfig::default(),
    )
    .unwrap();
    assert_eq!(store.num_log_sectors(), 731);

    // No time yet
    assert_eq!(
        store.log_event(EventCode::ConfigUpdate, 0),
        Err(StoreError::ClockUnavailable)
    );
    assert!(store.load().is_ok());

    let mut e = [LogEntry::ERASED; 10];
    assert_eq!(store.get_event_history(1, &mut e).unwrap(), 0);

    store.clock().set_timestamp(123);
    assert_eq!(
        store.log_event(EventCode::ConfigUpdate, 42).unwrap(),
        SaveOutcome::Written { slot: 0, id: 0 }
    );

    let mut store = reboot(store);
    assert!(store.load().is_ok());

    assert_eq!(store.get_event_history(1, &mut e).unwrap(), 0);
    assert_eq!(store.get_event_history(0, &mut e).unwrap(), 1);
    assert_eq!(e[0].timestamp(), 123);
    assert_eq!(e[0].event(), Some(EventCode::ConfigUpdate));
    assert_eq!(e[0].data(), 42);
    assert_eq!(e[1], LogEntry::ERASED);

    store.clock().set_timestamp(SECONDS_PER_DAY);

    assert_eq!(store.log_raw_event(0, 0), Err(StoreError::InvalidEvent(0)));
    assert_eq!(store.log_raw_event(8, 0), Err(StoreError::InvalidEvent(8)));
    assert!(store.log_event(EventCode::ConfigUpdate, 43).is_ok());

    let mut e = [LogEntry::ERASED; 10];
    assert_eq!(store.get_event_history(0, &mut e).unwrap(), 2);

    assert_eq!(e[0].timestamp(), SECONDS_PER_DAY);
    assert_eq!(e[0].event(), Some(EventCode::ConfigUpdate));
    assert_eq!(e[0].data(), 43);

    assert_eq!(e[1].timestamp(), 123);
    assert_eq!(e[1].event(), Some(EventCode::ConfigUpdate));
    assert_eq!(e[1].data(), 42);

    assert_eq!(e[2], LogEntry::ERASED);
}

#[test]
fn test_history_after_full_wrap() {
    let num_slots = 3u32;
    let mut store = open_small(num_slots, MockClock::new());

    let max_entries = num_slots as usize * LOG_CAPACITY;
    let last_entry = max_entries as u32 + 3;

    for i in 0..=last_entry {
        store.clock().set_timestamp((i + 1) * SECONDS_PER_DAY);
        store.log_event(EventCode::ConfigUpdate, i).unwrap();
    }

    let mut store = reboot(store);

    for i in 0..max_entries {
        let mut e = [LogEntry::ERASED; 1];
        assert_eq!(store.get_event_history(i, &mut e).unwrap(), 1, "offset {}", i);

        let idx = last_entry - i as u32;
        assert_eq!(e[0].timestamp(), (idx + 1) * SECONDS_PER_DAY);
        assert_eq!(e[0].event(), Some(EventCode::ConfigUpdate));
        assert_eq!(e[0].data(), idx);
    }

    let mut e = [LogEntry::ERASED; 1];
    assert_eq!(store.get_event_history(max_entries, &mut e).unwrap(), 0);

    let mut none: [LogEntry; 0] = [];
    assert_eq!(store.get_event_history(0, &mut none).unwrap(), 0);
}

#[test]
fn test_history_in_decreasing_recency() {
    let mut store = open_small(4, MockClock::with_timestamp(SECONDS_PER_DAY));

    for i in 0..50u32 {
        store.log_event(EventCode::Moisture, i).unwrap();
        store.clock().advance_secs(SECONDS_PER_DAY);
    }

    let mut e = [LogEntry::ERASED; 64];
    let count = store.get_event_history(0, &mut e).unwrap();
    assert_eq!(count, 50);

    for pair in e[..count].windows(2) {
        assert!(pair[0].timestamp() > pair[1].timestamp());
    }
}

#[test]
fn test_wear_wraps_to_first_slot() {
    let num_slots = 4u32;
    let mut store = open_small(num_slots, MockClock::with_timestamp(SECONDS_PER_DAY));

    for i in 0..num_slots {
        store.log_event(EventCode::AutoStart, i).unwrap();
        store.clock().advance_secs(SECONDS_PER_DAY);
    }
    for slot in 0..num_slots as usize {
        assert_eq!(store.flash().get_erase_count(store.slot_address(slot)), 1);
    }

    store.log_event(EventCode::AutoEnd, 0).unwrap();

    assert_eq!(store.flash().get_erase_count(store.slot_address(0)), 2);
    for slot in 1..num_slots as usize {
        assert_eq!(store.flash().get_erase_count(store.slot_address(slot)), 1);
    }
    assert_eq!(store.stats().current_slot, Some(0));
}

#[test]
fn test_id_counts_saves() {
    let t0 = 1_600_000_000;
    let mut store = open_small(5, MockClock::with_timestamp(t0));

    for _ in 0..12 {
        store.save_settings().unwrap();
        store.clock().advance_secs(3_600);
    }

    let mut store = reboot(store);
    let record = store.load().unwrap();
    assert_eq!(record.id, 11);
    assert_eq!(record.first_timestamp, t0);
}

#[test]
fn test_locator_finds_newest_after_every_write() {
    let num_slots = 5u32;
    let mut store = open_small(num_slots, MockClock::with_timestamp(SECONDS_PER_DAY));

    for n in 0..(3 * num_slots) {
        store.log_event(EventCode::ManualStart, n).unwrap();
        store.clock().advance_secs(SECONDS_PER_DAY);

        store = reboot(store);
        assert_eq!(store.load().unwrap().id, n);
        assert_eq!(store.stats().current_slot, Some((n % num_slots) as usize));
    }
}

#[test]
fn test_settings_survive_reboot() {
    let mut store = open_small(4, MockClock::with_timestamp(1_700_000_000));

    {
        let settings = store.settings_mut().unwrap();
        settings.enabled = true;
        settings.start_time_min = 5 * 60 + 30;
        settings.moisture_threshold = 40;
        settings.last_watering = 1_699_900_000;
        settings.zones[0] = ZoneSettings::new(
            ZoneOrder::Zone2,
            12,
            WateringDays::Weekdays(Weekdays::MONDAY | Weekdays::THURSDAY),
            "front lawn",
        )
        .unwrap();
        settings.zones[1] = ZoneSettings::new(ZoneOrder::Zone1, 8, WateringDays::EveryNDays(3), "hedge").unwrap();
        settings.zones[5] =
            ZoneSettings::new(ZoneOrder::Disabled, 0, WateringDays::EveryNDays(0), "").unwrap();
    }
    store.save_settings().unwrap();
    let expected = store.record().unwrap().clone();

    let mut store = reboot(store);
    assert_eq!(store.record().unwrap(), &expected);
}

#[test]
fn test_settings_save_does_not_repeat_events() {
    let mut store = open_small(4, MockClock::with_timestamp(SECONDS_PER_DAY));
    store.log_event(EventCode::ConfigUpdate, 1).unwrap();
    store.clock().advance_secs(SECONDS_PER_DAY);

    store.settings_mut().unwrap().enabled = true;
    assert_eq!(
        store.save_settings().unwrap(),
        SaveOutcome::Written { slot: 1, id: 1 }
    );

    let mut store = reboot(store);
    assert!(store.settings().unwrap().enabled);

    let mut e = [LogEntry::ERASED; 4];
    assert_eq!(store.get_event_history(0, &mut e).unwrap(), 2);
    assert_eq!((e[0].timestamp(), e[0].data()), (2 * SECONDS_PER_DAY, 0));
    assert_eq!((e[1].timestamp(), e[1].data()), (SECONDS_PER_DAY, 1));
    assert!(e[0].timestamp() > e[1].timestamp());
}

#[test]
fn test_virgin_settings_defaults() {
    let mut store = open_small(4, MockClock::new());
    let settings = store.settings().unwrap();

    assert!(!settings.enabled);
    assert_eq!(settings.last_watering, 0);
    assert_eq!(settings.start_time_min, 0);
    assert_eq!(settings.moisture_threshold, 0xFFFF);
    assert_eq!(settings.zones[3].order(), ZoneOrder::Zone4);
    assert_eq!(store.stats().current_slot, None);
}

#[test]
fn test_corruption_isolation() {
    let mut store = open_small(4, MockClock::with_timestamp(SECONDS_PER_DAY));
    for i in 0..3u32 {
        store.log_event(EventCode::AutoStart, i).unwrap();
        store.clock().advance_secs(SECONDS_PER_DAY);
    }

    // Flip one bit in the middle of slot 1's log array
    let slot1 = store.slot_address(1);
    store.flash_mut().flip_bit(slot1 + 2048, 5);

    assert!(matches!(
        store.load_slot(SlotRequest::RelativeBack(1)),
        Err(StoreError::Corrupt { address, .. }) if address == slot1
    ));
    // Other slots remain loadable
    assert_eq!(store.load_slot(SlotRequest::RelativeBack(2)).unwrap().id, 0);
    assert_eq!(store.load_slot(SlotRequest::Current).unwrap().id, 2);

    // History reaching into the corrupt slot fails instead of skipping it
    let mut e = [LogEntry::ERASED; 3];
    assert!(matches!(
        store.get_event_history(0, &mut e),
        Err(StoreError::Corrupt { .. })
    ));

    // The search probes slot 1 after a reboot and refuses to guess
    let mut store = reboot(store);
    assert!(matches!(store.load(), Err(StoreError::Corrupt { .. })));
}

#[test]
fn test_flood_of_saves_is_rate_limited() {
    let t0 = 1_000_000;
    let mut store = open_small(8, MockClock::with_timestamp(t0));

    assert_eq!(store.save_settings().unwrap(), SaveOutcome::Written { slot: 0, id: 0 });
    for _ in 0..20 {
        assert!(matches!(store.save_settings().unwrap(), SaveOutcome::Deferred { .. }));
        assert_eq!(store.poll().unwrap(), None);
    }
    assert_eq!(store.stats().total_writes, 1);
    assert_eq!(store.stats().deferred_saves, 20);

    // Poll every minute until the clock crosses into the next day
    let mut written = None;
    for _ in 0..(SECONDS_PER_DAY / 60) {
        store.clock().advance_secs(60);
        if let Some(outcome) = store.poll().unwrap() {
            written = Some((outcome, store.clock().unix_timestamp()));
            break;
        }
    }

    let (outcome, fired_at) = written.unwrap();
    assert_eq!(outcome, SaveOutcome::Written { slot: 1, id: 1 });
    assert!(fired_at >= 12 * SECONDS_PER_DAY);
    assert!(fired_at < 12 * SECONDS_PER_DAY + 60);
    assert_eq!(store.stats().total_writes, 2);
}

/// Second save in the same second is deferred, a save one day after the
/// first is written directly.
///
/// A wall-clock reading of 0 means the clock is not synchronized yet, so
/// the first save is made at a nonzero `T0`.
#[test]
fn test_save_one_day_after_first_is_not_limited() {
    let t0 = 1_000_000;
    let mut store = open_small(4, MockClock::with_timestamp(t0));

    assert_eq!(store.save_settings().unwrap(), SaveOutcome::Written { slot: 0, id: 0 });
    assert_eq!(
        store.save_settings().unwrap(),
        SaveOutcome::Deferred {
            not_before: 12 * SECONDS_PER_DAY
        }
    );
    assert_eq!(store.stats().total_writes, 1);

    store.clock().set_timestamp(t0 + SECONDS_PER_DAY);
    assert_eq!(store.save_settings().unwrap(), SaveOutcome::Written { slot: 1, id: 1 });
    assert_eq!(store.pending_write(), None);
    assert_eq!(store.stats().total_writes, 2);
}

#[test]
fn test_failed_write_does_not_lose_current_record() {
    let mut store = open_small(4, MockClock::with_timestamp(SECONDS_PER_DAY));
    store.log_event(EventCode::Boot, 0).unwrap();
    store.clock().advance_secs(SECONDS_PER_DAY);

    store.flash_mut().fail_next_erase();
    assert!(matches!(
        store.log_event(EventCode::ManualStart, 2),
        Err(StoreError::Io(_))
    ));

    // The failed event is not served before a reboot either
    let mut e = [LogEntry::ERASED; 2];
    assert_eq!(store.get_event_history(0, &mut e).unwrap(), 1);
    assert_eq!(e[0].event(), Some(EventCode::Boot));

    let mut store = reboot(store);
    assert_eq!(store.get_event_history(0, &mut e).unwrap(), 1);
    assert_eq!(e[0].event(), Some(EventCode::Boot));
}
