//! Memory-mapped block device implementation
//!
//! Provides read access to image files using memory-mapped I/O.
//! Reads are slices of the mapping, so concurrent readers never contend
//! on a lock.

use super::file_block_device::open_read_only;
use crate::domain::repositories::{BlockDevice, BlockDeviceError, sector_span};
use memmap2::Mmap;
use std::path::Path;

/// Memory-mapped block device reader implementation
///
/// # Example
///
/// ```ignore
/// let device = MmapBlockDevice::open("disk.img")?;
/// let superblock = device.read_sectors(2, 2)?;
/// ```
pub struct MmapBlockDevice {
    mmap: Mmap,
    path: String,
}

impl MmapBlockDevice {
    /// Maps a non-empty regular file read-only
    pub fn open(path: impl AsRef<Path>) -> Result<Self, BlockDeviceError> {
        let path = path.as_ref();
        let file = open_read_only(path)?;

        let size = file.metadata()?.len();
        if size == 0 {
            return Err(BlockDeviceError::Other(format!(
                "File {} has zero size",
                path.display()
            )));
        }

        // SAFETY: mapped read-only; truncating the image while mapped is undefined
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| {
            BlockDeviceError::Other(format!("Failed to memory-map file: {}", e))
        })?;

        Ok(Self {
            mmap,
            path: path.display().to_string(),
        })
    }

    /// Returns a slice at the specified byte offset and length
    ///
    /// This is a zero-copy operation.
    #[inline]
    pub fn slice_at(&self, offset: u64, length: usize) -> Option<&[u8]> {
        let start = usize::try_from(offset).ok()?;
        let end = start.checked_add(length)?;
        self.mmap.get(start..end)
    }
}

impl BlockDevice for MmapBlockDevice {
    fn read_sectors(
        &self,
        sector_offset: u64,
        sector_count: u64,
    ) -> Result<Vec<u8>, BlockDeviceError> {
        let (offset, length) = sector_span(sector_offset, sector_count, self.size())?;

        self.slice_at(offset, length)
            .map(<[u8]>::to_vec)
            .ok_or(BlockDeviceError::InvalidOffset {
                offset,
                device_size: self.size(),
            })
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn size(&self) -> u64 {
        self.mmap.len() as u64
    }
}
