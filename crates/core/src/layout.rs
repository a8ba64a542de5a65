//! Flash address-space layout
//!
//! Derives the static-file area and the record rotation area from the
//! hardware capacity identifier reported at boot.
//!
//! ```text
//! [Firmware]            0x000000   - data_begin
//! [Static files]        data_begin - data_end     (at most 128 KB)
//! [Record rotation]     log_begin  - log_end      (log_begin == data_end)
//! [Radio/calibration]   log_end    - flash_size   (5 sectors, never touched)
//! ```

use crate::config::{MAX_DATA_SIZE, RESERVED_TAIL_SECTORS, SECTOR_SIZE};

const SECTOR: u32 = SECTOR_SIZE as u32;
const KB: u32 = 1024;
const MB: u32 = 1024 * 1024;

/// Hardware flash size/partition identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashSizeMap {
    /// 4 Mbit, 256 KB + 256 KB
    Size4MMap256_256,
    /// 2 Mbit (no room for user data)
    Size2M,
    /// 8 Mbit, 512 KB + 512 KB
    Size8MMap512_512,
    /// 16 Mbit, 512 KB + 512 KB
    Size16MMap512_512,
    /// 32 Mbit, 512 KB + 512 KB
    Size32MMap512_512,
    /// 16 Mbit, 1024 KB + 1024 KB
    Size16MMap1024_1024,
    /// 32 Mbit, 1024 KB + 1024 KB
    Size32MMap1024_1024,
    /// 32 Mbit, 2048 KB + 2048 KB
    Size32MMap2048_2048,
    /// 64 Mbit, 1024 KB + 1024 KB
    Size64MMap1024_1024,
    /// 128 Mbit, 1024 KB + 1024 KB
    Size128MMap1024_1024,
}

/// Layout errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutError {
    /// Capacity identifier has no usable data area
    UnsupportedFlash(FlashSizeMap),
    /// Area boundary is not sector-aligned
    Misaligned(u32),
    /// Record rotation area is empty or inverted
    EmptyLogArea,
}

impl core::fmt::Display for LayoutError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LayoutError::UnsupportedFlash(map) => write!(f, "unsupported flash size map {:?}", map),
            LayoutError::Misaligned(addr) => write!(f, "address 0x{:08x} is not sector-aligned", addr),
            LayoutError::EmptyLogArea => write!(f, "record rotation area is empty"),
        }
    }
}

/// Byte offsets of the flash areas used by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashLayout {
    /// Total flash size in bytes
    pub flash_size: u32,
    /// Start of the static-file area
    pub data_begin: u32,
    /// End of the static-file area
    pub data_end: u32,
    /// Start of the record rotation area
    pub log_begin: u32,
    /// End of the record rotation area
    pub log_end: u32,
    /// Whether the second firmware partition is free for OTA updates
    pub supports_ota: bool,
}

impl FlashLayout {
    /// Derive the layout from the hardware capacity identifier
    pub fn from_size_map(map: FlashSizeMap) -> Result<Self, LayoutError> {
        let (flash_size, data_begin, supports_ota) = match map {
            FlashSizeMap::Size4MMap256_256 => (512 * KB, 256 * KB, false),
            FlashSizeMap::Size8MMap512_512 => (MB, 512 * KB, false),
            FlashSizeMap::Size16MMap512_512 => (2 * MB, MB, true),
            FlashSizeMap::Size16MMap1024_1024 => (2 * MB, MB, false),
            FlashSizeMap::Size32MMap512_512 => (4 * MB, MB, true),
            FlashSizeMap::Size32MMap1024_1024 => (4 * MB, 2 * MB, true),
            FlashSizeMap::Size32MMap2048_2048 => (4 * MB, 2 * MB, false),
            FlashSizeMap::Size64MMap1024_1024 => (8 * MB, 2 * MB, true),
            FlashSizeMap::Size128MMap1024_1024 => (16 * MB, 2 * MB, true),
            FlashSizeMap::Size2M => return Err(LayoutError::UnsupportedFlash(map)),
        };

        let log_end = flash_size - RESERVED_TAIL_SECTORS * SECTOR;
        let data_end = core::cmp::min(data_begin + MAX_DATA_SIZE, log_end);

        Ok(Self {
            flash_size,
            data_begin,
            data_end,
            log_begin: data_end,
            log_end,
            supports_ota,
        })
    }

    /// Build a layout with an explicit record rotation area and no file area
    ///
    /// Useful for boards with a custom partition table and for tests that
    /// want a small rotation pool.
    pub fn with_log_area(flash_size: u32, log_begin: u32, log_end: u32) -> Result<Self, LayoutError> {
        let layout = Self {
            flash_size,
            data_begin: log_begin,
            data_end: log_begin,
            log_begin,
            log_end,
            supports_ota: false,
        };
        layout.validate()?;
        Ok(layout)
    }

    /// Check alignment and non-emptiness of the rotation area
    pub fn validate(&self) -> Result<(), LayoutError> {
        for addr in [self.log_begin, self.log_end] {
            if addr % SECTOR != 0 {
                return Err(LayoutError::Misaligned(addr));
            }
        }
        if self.log_begin >= self.log_end || self.log_end > self.flash_size {
            return Err(LayoutError::EmptyLogArea);
        }
        Ok(())
    }

    /// Number of sectors in the record rotation pool
    pub fn num_log_sectors(&self) -> usize {
        (self.log_end.saturating_sub(self.log_begin) / SECTOR) as usize
    }

    /// Flash address of a rotation slot
    pub fn slot_address(&self, slot: usize) -> u32 {
        self.log_begin + slot as u32 * SECTOR
    }

    /// Rotation slot holding `address`, if it lies in the rotation area
    pub fn slot_of(&self, address: u32) -> Option<usize> {
        if address < self.log_begin || address >= self.log_end {
            return None;
        }
        Some(((address - self.log_begin) / SECTOR) as usize)
    }
}
