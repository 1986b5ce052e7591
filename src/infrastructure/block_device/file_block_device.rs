//! File-backed block device
//!
//! Positioned reads through a plain file handle. Works for image files and
//! for device nodes such as /dev/sdX, whose size is found by seeking.

use crate::domain::repositories::{BlockDevice, BlockDeviceError, sector_span};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

/// Block device reader over a seekable file handle
///
/// # Example
///
/// ```ignore
/// let device = FileBlockDevice::open("/dev/sdb1")?;
/// let superblock = device.read_sectors(2, 2)?;
/// ```
pub struct FileBlockDevice {
    file: Mutex<File>,
    path: String,
    size: u64,
}

impl FileBlockDevice {
    /// Opens a device or image file for reading
    pub fn open(path: impl AsRef<Path>) -> Result<Self, BlockDeviceError> {
        let path = path.as_ref();
        let file = open_read_only(path)?;
        let size = Self::get_size(&file, path)?;

        Ok(Self {
            file: Mutex::new(file),
            path: path.display().to_string(),
            size,
        })
    }

    /// Gets the device/file size
    fn get_size(file: &File, path: &Path) -> Result<u64, BlockDeviceError> {
        let metadata = file.metadata()?;

        if metadata.is_file() {
            return Ok(metadata.len());
        }

        // Device nodes report zero length in their metadata
        let mut handle = file.try_clone()?;
        let size = handle.seek(SeekFrom::End(0))?;
        handle.seek(SeekFrom::Start(0))?;

        if size == 0 {
            Err(BlockDeviceError::Other(format!(
                "Could not determine size of {}",
                path.display()
            )))
        } else {
            Ok(size)
        }
    }
}

impl BlockDevice for FileBlockDevice {
    fn read_sectors(
        &self,
        sector_offset: u64,
        sector_count: u64,
    ) -> Result<Vec<u8>, BlockDeviceError> {
        let (offset, length) = sector_span(sector_offset, sector_count, self.size)?;
        let mut buffer = vec![0u8; length];
        if length == 0 {
            return Ok(buffer);
        }

        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(offset))?;

        let mut filled = 0;
        while filled < length {
            match file.read(&mut buffer[filled..]) {
                Ok(0) => {
                    return Err(BlockDeviceError::ShortRead {
                        offset,
                        expected: length,
                        actual: filled,
                    });
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(BlockDeviceError::IoError(e)),
            }
        }

        Ok(buffer)
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn size(&self) -> u64 {
        self.size
    }
}

/// Opens `path` read-only, mapping the common failures onto device errors
pub(super) fn open_read_only(path: &Path) -> Result<File, BlockDeviceError> {
    if !path.exists() {
        return Err(BlockDeviceError::DeviceNotFound(path.display().to_string()));
    }

    OpenOptions::new().read(true).open(path).map_err(|e| {
        if e.kind() == ErrorKind::PermissionDenied {
            BlockDeviceError::PermissionDenied(format!("{} - try running with sudo", path.display()))
        } else {
            BlockDeviceError::IoError(e)
        }
    })
}
