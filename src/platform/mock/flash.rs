//! Mock Flash implementation for testing
//!
//! Provides in-memory Flash simulation for unit tests.

use crate::platform::{error::FlashError, traits::FlashInterface, Result};
use core::ops::Range;
use std::vec;
use std::vec::Vec;

/// Flash block size (4 KB)
const BLOCK_SIZE: u32 = 4096;

/// Flash capacity (4 MB, same as NodeMCU)
const FLASH_CAPACITY: u32 = 4 * 1024 * 1024;

/// Firmware image, protected (first 1 MB)
const FIRMWARE_SIZE: u32 = 0x10_0000;

/// Radio calibration sectors at the end of flash, protected
const RADIO_DATA_START: u32 = FLASH_CAPACITY - 5 * BLOCK_SIZE;

/// Write granularity
const WORD_SIZE: u32 = 4;

/// Mock Flash implementation
///
/// Simulates Flash storage in memory for testing. Supports:
/// - Read/write/erase operations with protected regions
/// - Corruption and bit-flip injection for testing checksum handling
/// - One-shot erase/write/read failures for testing error propagation
/// - Erase count tracking for wear leveling validation
/// - Power-loss simulation for reliability testing
///
/// # Example
///
/// ```ignore
/// use sprinkler_store::platform::mock::MockFlash;
/// use sprinkler_store::platform::traits::FlashInterface;
///
/// let mut flash = MockFlash::new();
///
/// // Erase a sector
/// flash.erase(0x120000, 4096).unwrap();
///
/// // Write data
/// let data = [0x01, 0x02, 0x03, 0x04];
/// flash.write(0x120000, &data).unwrap();
///
/// // Read back
/// let mut buf = [0u8; 4];
/// flash.read(0x120000, &mut buf).unwrap();
/// assert_eq!(buf, data);
///
/// // Check erase count
/// assert_eq!(flash.get_erase_count(0x120000), 1);
/// ```
#[derive(Debug)]
pub struct MockFlash {
    /// Flash storage (initialized to 0xFF - erased state)
    storage: Vec<u8>,
    /// Erase count per block (for wear leveling testing)
    erase_counts: Vec<u32>,
    /// Region that may be erased and written
    writable: Range<u32>,
    /// Simulated power loss flag
    power_loss: bool,
    fail_next_erase: bool,
    fail_next_write: bool,
    fail_next_read: bool,
}

impl MockFlash {
    /// Create a 4 MB mock Flash with the firmware and radio sectors protected
    pub fn new() -> Self {
        Self::with_region(FLASH_CAPACITY, FIRMWARE_SIZE..RADIO_DATA_START)
    }

    /// Create a mock Flash of `capacity` bytes, writable only in `writable`
    pub fn with_region(capacity: u32, writable: Range<u32>) -> Self {
        let block_count = (capacity / BLOCK_SIZE) as usize;

        Self {
            storage: vec![0xFF; capacity as usize],
            erase_counts: vec![0; block_count],
            writable,
            power_loss: false,
            fail_next_erase: false,
            fail_next_write: false,
            fail_next_read: false,
        }
    }

    /// Get Flash contents (for test verification)
    pub fn get_contents(&self, address: u32, len: usize) -> Vec<u8> {
        self.storage[address as usize..(address as usize + len)].to_vec()
    }

    /// Inject corruption at address (for testing error recovery)
    ///
    /// Overwrites the range with a fixed pattern, bypassing erase rules.
    pub fn inject_corruption(&mut self, address: u32, len: usize) {
        for byte in &mut self.storage[address as usize..address as usize + len] {
            *byte = 0xAA; // Corrupt pattern
        }
    }

    /// Flip a single bit (for testing checksum coverage)
    pub fn flip_bit(&mut self, address: u32, bit: u8) {
        self.storage[address as usize] ^= 1 << (bit % 8);
    }

    /// Get erase count for a block (for wear leveling validation)
    ///
    /// Returns the number of times a block has been erased.
    pub fn get_erase_count(&self, address: u32) -> u32 {
        let block_id = (address / BLOCK_SIZE) as usize;
        self.erase_counts[block_id]
    }

    /// Get total erase count across all blocks
    pub fn get_total_erase_count(&self) -> u32 {
        self.erase_counts.iter().sum()
    }

    /// Simulate power loss during next write operation
    ///
    /// The next write will only partially complete, simulating
    /// power loss mid-operation for reliability testing.
    pub fn simulate_power_loss(&mut self) {
        self.power_loss = true;
    }

    /// Make the next erase fail without touching storage
    pub fn fail_next_erase(&mut self) {
        self.fail_next_erase = true;
    }

    /// Make the next write fail without touching storage
    pub fn fail_next_write(&mut self) {
        self.fail_next_write = true;
    }

    /// Make the next read fail
    pub fn fail_next_read(&mut self) {
        self.fail_next_read = true;
    }

    /// Check if a range lies in the writable region
    fn is_writable(&self, address: u32, len: u32) -> bool {
        match address.checked_add(len) {
            Some(end) => address >= self.writable.start && end <= self.writable.end,
            None => false,
        }
    }

    /// Check if address is block-aligned
    fn is_block_aligned(&self, address: u32) -> bool {
        address % BLOCK_SIZE == 0
    }
}

impl Default for MockFlash {
    fn default() -> Self {
        Self::new()
    }
}

impl FlashInterface for MockFlash {
    fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<()> {
        // Validate address range
        if address as usize + buf.len() > self.storage.len() {
            return Err(FlashError::InvalidAddress.into());
        }

        if core::mem::take(&mut self.fail_next_read) {
            return Err(FlashError::ReadFailed.into());
        }

        // Copy from storage
        buf.copy_from_slice(&self.storage[address as usize..(address as usize + buf.len())]);

        Ok(())
    }

    fn write(&mut self, address: u32, data: &[u8]) -> Result<()> {
        // Validate address is in writable region
        if !self.is_writable(address, data.len() as u32) {
            return Err(FlashError::InvalidAddress.into());
        }

        // Validate word alignment
        if address % WORD_SIZE != 0 || data.len() as u32 % WORD_SIZE != 0 {
            return Err(FlashError::InvalidAddress.into());
        }

        if core::mem::take(&mut self.fail_next_write) {
            return Err(FlashError::WriteFailed.into());
        }

        // Simulate power loss (partial write)
        let write_len = if core::mem::take(&mut self.power_loss) {
            // Only write half the data to simulate power loss
            data.len() / 2
        } else {
            data.len()
        };

        // Flash can only change bits from 1→0 (simulate this behavior)
        let start = address as usize;
        for (cell, byte) in self.storage[start..start + write_len].iter_mut().zip(data) {
            *cell &= *byte;
        }

        Ok(())
    }

    fn erase(&mut self, address: u32, size: u32) -> Result<()> {
        // Validate address is in writable region
        if !self.is_writable(address, size) {
            return Err(FlashError::InvalidAddress.into());
        }

        // Validate address and size are block-aligned
        if !self.is_block_aligned(address) || size % BLOCK_SIZE != 0 {
            return Err(FlashError::InvalidAddress.into());
        }

        if core::mem::take(&mut self.fail_next_erase) {
            return Err(FlashError::EraseFailed.into());
        }

        // Erase blocks (set to 0xFF)
        let start = address as usize;
        self.storage[start..start + size as usize].fill(0xFF);

        // Update erase counts
        let start_block = (address / BLOCK_SIZE) as usize;
        for count in &mut self.erase_counts[start_block..start_block + (size / BLOCK_SIZE) as usize] {
            *count += 1;
        }

        Ok(())
    }

    fn block_size(&self) -> u32 {
        BLOCK_SIZE
    }

    fn capacity(&self) -> u32 {
        self.storage.len() as u32
    }
}
