//! Block device implementations

mod file_block_device;
mod memory_block_device;
mod mmap_block_device;

pub use file_block_device::FileBlockDevice;
pub use memory_block_device::MemoryBlockDevice;
pub use mmap_block_device::MmapBlockDevice;

use crate::domain::repositories::{BlockDevice, BlockDeviceError};
use std::path::Path;

/// A device opened by [`open_image`], either mapped or read through a handle
pub enum ImageDevice {
    Mapped(MmapBlockDevice),
    File(FileBlockDevice),
}

impl BlockDevice for ImageDevice {
    fn read_sectors(
        &self,
        sector_offset: u64,
        sector_count: u64,
    ) -> Result<Vec<u8>, BlockDeviceError> {
        match self {
            Self::Mapped(device) => device.read_sectors(sector_offset, sector_count),
            Self::File(device) => device.read_sectors(sector_offset, sector_count),
        }
    }

    fn path(&self) -> &str {
        match self {
            Self::Mapped(device) => device.path(),
            Self::File(device) => device.path(),
        }
    }

    fn size(&self) -> u64 {
        match self {
            Self::Mapped(device) => device.size(),
            Self::File(device) => device.size(),
        }
    }
}

/// Opens an image or device node for reading
///
/// Non-empty regular files are memory-mapped. Device nodes, and anything
/// else that cannot be mapped by length, go through a file handle.
pub fn open_image(path: impl AsRef<Path>) -> Result<ImageDevice, BlockDeviceError> {
    let path = path.as_ref();
    let mappable = std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.len() > 0)
        .unwrap_or(false);

    if mappable {
        tracing::debug!(path = %path.display(), "memory-mapping image");
        MmapBlockDevice::open(path).map(ImageDevice::Mapped)
    } else {
        tracing::debug!(path = %path.display(), "reading device through file handle");
        FileBlockDevice::open(path).map(ImageDevice::File)
    }
}
