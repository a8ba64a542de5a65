//! Sector store
//!
//! Synchronous erase/program/read of whole sectors inside the record
//! rotation area. This is the only part of the store that touches flash.

use sprinkler_core::config::SECTOR_SIZE;
use sprinkler_core::layout::FlashLayout;
use sprinkler_core::record::Record;

use super::error::{Result, StoreError};
use crate::platform::{FlashError, FlashInterface};
use crate::{log_debug, log_error};

/// Whole-sector access to the record rotation area
pub struct SectorStore<F: FlashInterface> {
    /// Flash interface
    flash: F,
    /// Area boundaries
    layout: FlashLayout,
}

impl<F: FlashInterface> SectorStore<F> {
    /// Wrap a flash device
    ///
    /// Fails if the rotation area does not fit the device.
    pub fn new(flash: F, layout: FlashLayout) -> Result<Self> {
        layout.validate()?;
        if layout.log_end > flash.capacity() || flash.block_size() as usize != SECTOR_SIZE {
            log_error!(
                "Error: record area 0x{:08x}..0x{:08x} not available",
                layout.log_begin,
                layout.log_end
            );
            return Err(StoreError::AreaUnavailable);
        }

        Ok(Self { flash, layout })
    }

    /// Flash area layout
    pub fn layout(&self) -> &FlashLayout {
        &self.layout
    }

    /// Read one sector into `buf`
    pub fn read_sector(&mut self, address: u32, buf: &mut [u8; SECTOR_SIZE]) -> Result<()> {
        self.check_address(address)?;
        self.flash.read(address, buf).map_err(|e| {
            log_error!("Error: failed to read sector at 0x{:08x}", address);
            StoreError::Io(e)
        })
    }

    /// Erase one sector
    pub fn erase_sector(&mut self, address: u32) -> Result<()> {
        self.check_address(address)?;
        log_debug!("erase @0x{:08x}", address);
        self.flash.erase(address, SECTOR_SIZE as u32).map_err(|e| {
            log_error!("Error: failed to erase sector {}", address / SECTOR_SIZE as u32);
            StoreError::Io(e)
        })
    }

    /// Program one erased sector
    pub fn write_sector(&mut self, address: u32, data: &[u8; SECTOR_SIZE]) -> Result<()> {
        self.check_address(address)?;
        log_debug!("write @0x{:08x} size 0x{:04x}", address, SECTOR_SIZE);
        self.flash.write(address, data).map_err(|e| {
            log_error!(
                "Error: failed to write 0x{:x} bytes at offset 0x{:x}",
                SECTOR_SIZE,
                address
            );
            StoreError::Io(e)
        })
    }

    /// Read and validate the record stored at `address`
    pub fn load_record(&mut self, address: u32) -> Result<Record> {
        let mut buf = [0u8; SECTOR_SIZE];
        self.read_sector(address, &mut buf)?;

        Record::decode(&buf).map_err(|e| {
            let error = StoreError::from_record(address, e);
            match error {
                StoreError::Corrupt { stored, computed, .. } => log_error!(
                    "Error: invalid record checksum 0x{:08x}, expected 0x{:08x}",
                    stored,
                    computed
                ),
                _ => log_error!("Error: invalid record at 0x{:08x}", address),
            }
            error
        })
    }

    /// Erase the sector at `address` and write `record` to it
    pub fn store_record(&mut self, address: u32, record: &Record) -> Result<()> {
        self.erase_sector(address)?;

        let mut buf = [0u8; SECTOR_SIZE];
        record.encode(&mut buf);
        self.write_sector(address, &buf)
    }

    /// Get Flash interface reference
    pub fn flash(&self) -> &F {
        &self.flash
    }

    /// Get Flash interface reference (for testing)
    pub fn flash_mut(&mut self) -> &mut F {
        &mut self.flash
    }

    /// Release the flash device
    pub fn into_flash(self) -> F {
        self.flash
    }

    /// Check that `address` is a sector boundary inside the rotation area
    fn check_address(&self, address: u32) -> Result<()> {
        if address % SECTOR_SIZE as u32 != 0 || self.layout.slot_of(address).is_none() {
            log_error!("Error: invalid config addr 0x{:08x}", address);
            return Err(StoreError::Io(FlashError::InvalidAddress.into()));
        }
        Ok(())
    }
}
