//! In-memory block device
//!
//! Serves sector reads from an owned buffer, for images already loaded into
//! memory and for building synthetic images.

use crate::domain::repositories::{BlockDevice, BlockDeviceError, sector_span};

/// Block device backed by a byte buffer
#[derive(Debug, Clone)]
pub struct MemoryBlockDevice {
    data: Vec<u8>,
    label: String,
}

impl MemoryBlockDevice {
    pub fn new(data: Vec<u8>) -> Self {
        Self::with_label(data, "<memory>")
    }

    /// Creates a device reported under `label` as its path
    pub fn with_label(data: Vec<u8>, label: impl Into<String>) -> Self {
        Self {
            data,
            label: label.into(),
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

impl BlockDevice for MemoryBlockDevice {
    fn read_sectors(
        &self,
        sector_offset: u64,
        sector_count: u64,
    ) -> Result<Vec<u8>, BlockDeviceError> {
        let (offset, length) = sector_span(sector_offset, sector_count, self.size())?;
        let start = usize::try_from(offset).unwrap_or(usize::MAX);

        match start.checked_add(length).and_then(|end| self.data.get(start..end)) {
            Some(bytes) => Ok(bytes.to_vec()),
            None if length == 0 => Ok(Vec::new()),
            None => Err(BlockDeviceError::InvalidOffset {
                offset,
                device_size: self.size(),
            }),
        }
    }

    fn path(&self) -> &str {
        &self.label
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }
}
