//! Block device trait
//!
//! Defines the interface for reading raw sectors from a device or image.
//! The filesystem layer only ever talks to storage through this trait.

use std::io;
use thiserror::Error;

/// Fixed sector granularity of every device read
pub const SECTOR_SIZE: usize = 512;

/// Errors that can occur when reading from a block device
#[derive(Error, Debug)]
pub enum BlockDeviceError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    #[error("Invalid offset: {offset} exceeds device size {device_size}")]
    InvalidOffset { offset: u64, device_size: u64 },

    #[error("Short read at offset {offset}: expected {expected} bytes, got {actual}")]
    ShortRead {
        offset: u64,
        expected: usize,
        actual: usize,
    },

    #[error("Device error: {0}")]
    Other(String),
}

/// Trait for positioned, sector-granular reads
///
/// Implementations must return exactly `sector_count * SECTOR_SIZE` bytes or
/// fail. No caching is implied.
///
/// # Example
///
/// ```ignore
/// let device = FileBlockDevice::open("disk.img")?;
/// let superblock = device.read_sectors(2, 2)?;
/// ```
pub trait BlockDevice: Send + Sync {
    /// Reads `sector_count` sectors starting at absolute sector `sector_offset`
    fn read_sectors(&self, sector_offset: u64, sector_count: u64)
    -> Result<Vec<u8>, BlockDeviceError>;

    /// Returns the device path (or a label for in-memory devices)
    fn path(&self) -> &str;

    /// Returns the total size in bytes
    fn size(&self) -> u64;

    /// Returns the number of whole sectors on the device
    fn sector_count(&self) -> u64 {
        self.size() / SECTOR_SIZE as u64
    }
}

/// Converts a sector request into a byte range, checked against `device_size`.
///
/// Returns the starting byte offset and the exact byte length of the request.
pub fn sector_span(
    sector_offset: u64,
    sector_count: u64,
    device_size: u64,
) -> Result<(u64, usize), BlockDeviceError> {
    let overflow = || BlockDeviceError::InvalidOffset {
        offset: u64::MAX,
        device_size,
    };

    let offset = sector_offset
        .checked_mul(SECTOR_SIZE as u64)
        .ok_or_else(overflow)?;
    let length = sector_count
        .checked_mul(SECTOR_SIZE as u64)
        .and_then(|len| usize::try_from(len).ok())
        .ok_or_else(overflow)?;

    if length == 0 {
        return Ok((offset, 0));
    }

    if offset >= device_size {
        return Err(BlockDeviceError::InvalidOffset {
            offset,
            device_size,
        });
    }

    let available = device_size - offset;
    if (length as u64) > available {
        return Err(BlockDeviceError::ShortRead {
            offset,
            expected: length,
            actual: available as usize,
        });
    }

    Ok((offset, length))
}
