//! Flash interface trait
//!
//! This module defines the Flash storage interface that platform implementations must provide.
//! Flash holds the firmware image, the static-file area and the record rotation area.

use crate::platform::Result;

/// Flash interface trait
///
/// Platform implementations must provide this interface for Flash read/write/erase operations.
///
/// # Flash Characteristics
///
/// - Flash is organized in 4 KB sectors
/// - Erase operations set all bytes to 0xFF
/// - Write operations can only change bits from 1→0 (must erase first to reset to 1)
/// - Writes are word-granular: address and length must be multiples of 4
/// - Operations are synchronous and block until the hardware completes
///
/// # Safety Invariants
///
/// - Only one owner per Flash instance (no concurrent access)
/// - Must not erase/write the firmware region (implementations must validate addresses)
/// - The radio calibration sectors at the end of flash are never touched
///
/// # Memory Layout (4 MB, 512 KB + 512 KB map)
///
/// ```text
/// [Firmware]          0x000000 - 0x100000 (1 MB)    - DO NOT WRITE
/// [Static files]      0x100000 - 0x120000 (128 KB)
/// [Record rotation]   0x120000 - 0x3FB000 (731 sectors)
/// [Radio/calibration] 0x3FB000 - 0x400000 (5 sectors) - DO NOT WRITE
/// ```
pub trait FlashInterface {
    /// Read data from Flash
    ///
    /// Reads `buf.len()` bytes from Flash starting at `address`.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Flash(FlashError::InvalidAddress)` if address is out of bounds.
    /// Returns `PlatformError::Flash(FlashError::ReadFailed)` if the read operation fails.
    fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<()>;

    /// Write data to Flash
    ///
    /// Writes `data` to Flash starting at `address`. The target must have
    /// been erased since it was last written.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Flash(FlashError::InvalidAddress)` if address is protected or misaligned.
    /// Returns `PlatformError::Flash(FlashError::WriteFailed)` if the write operation fails.
    fn write(&mut self, address: u32, data: &[u8]) -> Result<()>;

    /// Erase Flash region
    ///
    /// Erases Flash starting at `address` for `size` bytes, setting them to 0xFF.
    /// Both must be aligned to the block size.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Flash(FlashError::InvalidAddress)` if the region is
    /// protected or misaligned.
    /// Returns `PlatformError::Flash(FlashError::EraseFailed)` if the erase operation fails.
    fn erase(&mut self, address: u32, size: u32) -> Result<()>;

    /// Get Flash block size
    ///
    /// Returns the minimum erasable unit size (4096 bytes).
    fn block_size(&self) -> u32;

    /// Get total Flash size
    ///
    /// Returns the total Flash capacity in bytes.
    fn capacity(&self) -> u32;
}
