//! Zone configuration entries
//!
//! Each record holds [`NUM_ZONES`](crate::config::NUM_ZONES) zone entries of
//! 28 bytes:
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │ order:3 | time_min:6 | days:7 | dow:1  (u32)  │  Offset: 0
//! ├───────────────────────────────────────────────┤
//! │ name: 21 bytes, NUL padded                    │  Offset: 4
//! ├───────────────────────────────────────────────┤
//! │ reserved: 3 bytes (zero)                      │  Offset: 25
//! └───────────────────────────────────────────────┘
//! ```

use bitflags::bitflags;
use heapless::String;

use super::error::RecordError;

/// Maximum zone name length in bytes (one byte of the field stays NUL)
pub const ZONE_NAME_LEN: usize = 20;

const NAME_FIELD_LEN: usize = ZONE_NAME_LEN + 1;

const ORDER_BITS: u32 = 3;
const TIME_BITS: u32 = 6;
const DAYS_BITS: u32 = 7;

const TIME_SHIFT: u32 = ORDER_BITS;
const DAYS_SHIFT: u32 = TIME_SHIFT + TIME_BITS;
const DOW_SHIFT: u32 = DAYS_SHIFT + DAYS_BITS;

/// Longest watering time in minutes
pub const MAX_WATERING_MIN: u8 = (1 << TIME_BITS) - 1;

/// Longest "every N days" interval
pub const MAX_INTERVAL_DAYS: u8 = (1 << DAYS_BITS) - 1;

/// Position of a zone in the watering sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ZoneOrder {
    /// Zone is skipped by scheduled watering
    Disabled = 0,
    Zone1 = 1,
    Zone2 = 2,
    Zone3 = 3,
    Zone4 = 4,
    Zone5 = 5,
    Zone6 = 6,
}

impl ZoneOrder {
    /// Order for the zone at `index` in the default sequence
    pub fn for_index(index: usize) -> Self {
        match index {
            0 => ZoneOrder::Zone1,
            1 => ZoneOrder::Zone2,
            2 => ZoneOrder::Zone3,
            3 => ZoneOrder::Zone4,
            4 => ZoneOrder::Zone5,
            5 => ZoneOrder::Zone6,
            _ => ZoneOrder::Disabled,
        }
    }
}

impl TryFrom<u8> for ZoneOrder {
    type Error = RecordError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ZoneOrder::Disabled),
            1 => Ok(ZoneOrder::Zone1),
            2 => Ok(ZoneOrder::Zone2),
            3 => Ok(ZoneOrder::Zone3),
            4 => Ok(ZoneOrder::Zone4),
            5 => Ok(ZoneOrder::Zone5),
            6 => Ok(ZoneOrder::Zone6),
            _ => Err(RecordError::InvalidZoneOrder(value)),
        }
    }
}

bitflags! {
    /// Days of the week a zone is watered
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Weekdays: u8 {
        const MONDAY = 1 << 0;
        const TUESDAY = 1 << 1;
        const WEDNESDAY = 1 << 2;
        const THURSDAY = 1 << 3;
        const FRIDAY = 1 << 4;
        const SATURDAY = 1 << 5;
        const SUNDAY = 1 << 6;
    }
}

/// Watering schedule of a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WateringDays {
    /// Water on the given weekdays
    Weekdays(Weekdays),
    /// Water every N days (0 disables scheduled watering)
    EveryNDays(u8),
}

impl WateringDays {
    fn pack(&self) -> (u32, u32) {
        match self {
            WateringDays::Weekdays(days) => (u32::from(days.bits()), 1),
            WateringDays::EveryNDays(n) => (u32::from(*n), 0),
        }
    }
}

/// Configuration of one irrigation zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneSettings {
    order: ZoneOrder,
    time_min: u8,
    days: WateringDays,
    name: String<ZONE_NAME_LEN>,
}

impl ZoneSettings {
    /// Size of a zone entry in bytes
    pub const SIZE: usize = 28;

    /// Create zone settings, validating every field range
    pub fn new(order: ZoneOrder, time_min: u8, days: WateringDays, name: &str) -> Result<Self, RecordError> {
        if time_min > MAX_WATERING_MIN {
            return Err(RecordError::InvalidWateringTime(time_min));
        }
        let raw_days = match days {
            WateringDays::Weekdays(mask) => mask.bits(),
            WateringDays::EveryNDays(n) => n,
        };
        if raw_days > MAX_INTERVAL_DAYS {
            return Err(RecordError::InvalidWateringDays(raw_days));
        }
        if name.as_bytes().contains(&0) {
            return Err(RecordError::InvalidName);
        }

        let mut stored = String::new();
        stored.push_str(name).map_err(|_| RecordError::NameTooLong)?;

        Ok(Self {
            order,
            time_min,
            days,
            name: stored,
        })
    }

    /// Default settings for the zone at `index` on an unwritten store
    pub fn default_for(index: usize) -> Self {
        Self {
            order: ZoneOrder::for_index(index),
            time_min: 0,
            days: WateringDays::EveryNDays(0),
            name: String::new(),
        }
    }

    pub fn order(&self) -> ZoneOrder {
        self.order
    }

    pub fn time_min(&self) -> u8 {
        self.time_min
    }

    pub fn days(&self) -> WateringDays {
        self.days
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Serialize zone entry to bytes (little-endian)
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let (days, dow) = self.days.pack();
        let word = u32::from(self.order as u8)
            | (u32::from(self.time_min) << TIME_SHIFT)
            | (days << DAYS_SHIFT)
            | (dow << DOW_SHIFT);

        let mut buf = [0u8; Self::SIZE];
        buf[0..4].copy_from_slice(&word.to_le_bytes());
        let name = self.name.as_bytes();
        buf[4..4 + name.len()].copy_from_slice(name);
        buf
    }

    /// Deserialize zone entry from bytes (little-endian)
    pub fn from_bytes(buf: &[u8; Self::SIZE]) -> Result<Self, RecordError> {
        let word = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);

        let order = ZoneOrder::try_from((word & mask(ORDER_BITS)) as u8)?;
        let time_min = ((word >> TIME_SHIFT) & mask(TIME_BITS)) as u8;
        let raw_days = ((word >> DAYS_SHIFT) & mask(DAYS_BITS)) as u8;
        let days = if (word >> DOW_SHIFT) & 1 == 1 {
            WateringDays::Weekdays(Weekdays::from_bits_truncate(raw_days))
        } else {
            WateringDays::EveryNDays(raw_days)
        };

        let field = &buf[4..4 + NAME_FIELD_LEN];
        let len = field.iter().position(|&b| b == 0).unwrap_or(NAME_FIELD_LEN);
        if len > ZONE_NAME_LEN {
            return Err(RecordError::NameTooLong);
        }
        let name = core::str::from_utf8(&field[..len]).map_err(|_| RecordError::InvalidName)?;

        Self::new(order, time_min, days, name)
    }
}

const fn mask(bits: u32) -> u32 {
    (1 << bits) - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_word_packing() {
        let zone = ZoneSettings::new(
            ZoneOrder::Zone3,
            15,
            WateringDays::Weekdays(Weekdays::MONDAY | Weekdays::FRIDAY),
            "lawn",
        )
        .unwrap();
        let bytes = zone.to_bytes();

        // order 3, time 15 << 3, days 0b10001 << 9, dow 1 << 16
        let expected: u32 = 3 | (15 << 3) | (0b1_0001 << 9) | (1 << 16);
        assert_eq!(&bytes[0..4], &expected.to_le_bytes());
        assert_eq!(&bytes[4..8], b"lawn");
        assert!(bytes[8..].iter().all(|&b| b == 0));

        assert_eq!(ZoneSettings::from_bytes(&bytes).unwrap(), zone);
    }

    #[test]
    fn test_interval_days() {
        let zone = ZoneSettings::new(ZoneOrder::Zone1, 63, WateringDays::EveryNDays(127), "").unwrap();
        let decoded = ZoneSettings::from_bytes(&zone.to_bytes()).unwrap();

        assert_eq!(decoded.days(), WateringDays::EveryNDays(127));
        assert_eq!(decoded.time_min(), 63);
    }

    #[test]
    fn test_field_validation() {
        assert_eq!(
            ZoneSettings::new(ZoneOrder::Zone1, 64, WateringDays::EveryNDays(0), ""),
            Err(RecordError::InvalidWateringTime(64))
        );
        assert_eq!(
            ZoneSettings::new(ZoneOrder::Zone1, 0, WateringDays::EveryNDays(128), ""),
            Err(RecordError::InvalidWateringDays(128))
        );
        assert_eq!(
            ZoneSettings::new(ZoneOrder::Zone1, 0, WateringDays::EveryNDays(0), "a-name-that-is-too-long"),
            Err(RecordError::NameTooLong)
        );
        // Exactly 20 bytes fits
        assert!(ZoneSettings::new(ZoneOrder::Zone1, 0, WateringDays::EveryNDays(0), "abcdefghijklmnopqrst").is_ok());
    }

    #[test]
    fn test_weekday_mask_outside_week_rejected() {
        let days = Weekdays::from_bits_retain(0x80 | Weekdays::MONDAY.bits());
        assert_eq!(
            ZoneSettings::new(ZoneOrder::Zone1, 10, WateringDays::Weekdays(days), ""),
            Err(RecordError::InvalidWateringDays(0x81))
        );

        let all = ZoneSettings::new(ZoneOrder::Zone1, 10, WateringDays::Weekdays(Weekdays::all()), "").unwrap();
        assert_eq!(
            ZoneSettings::from_bytes(&all.to_bytes()).unwrap().days(),
            WateringDays::Weekdays(Weekdays::all())
        );
    }

    #[test]
    fn test_decode_rejects_bad_order() {
        let mut bytes = ZoneSettings::default_for(0).to_bytes();
        bytes[0] = 7;
        assert_eq!(ZoneSettings::from_bytes(&bytes), Err(RecordError::InvalidZoneOrder(7)));
    }

    #[test]
    fn test_decode_rejects_unterminated_name() {
        let mut bytes = ZoneSettings::default_for(0).to_bytes();
        bytes[4..25].fill(b'x');
        assert_eq!(ZoneSettings::from_bytes(&bytes), Err(RecordError::NameTooLong));
    }

    #[test]
    fn test_default_order() {
        assert_eq!(ZoneSettings::default_for(0).order(), ZoneOrder::Zone1);
        assert_eq!(ZoneSettings::default_for(5).order(), ZoneOrder::Zone6);
        assert_eq!(ZoneSettings::default_for(0).days(), WateringDays::EveryNDays(0));
    }
}
