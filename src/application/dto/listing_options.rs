//! Listing options DTO

use crate::infrastructure::file_systems::ext4::ROOT_INODE;
use std::path::PathBuf;

/// Options for listing a directory from an image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingOptions {
    /// Path to the device or image file
    pub device_path: PathBuf,
    /// Directory inode to enumerate
    pub inode: u32,
}

impl Default for ListingOptions {
    fn default() -> Self {
        Self {
            device_path: PathBuf::new(),
            inode: ROOT_INODE,
        }
    }
}

impl ListingOptions {
    /// Creates options listing the root directory of the given device
    pub fn new(device_path: impl Into<PathBuf>) -> Self {
        Self {
            device_path: device_path.into(),
            ..Default::default()
        }
    }

    /// Sets the directory inode to enumerate
    pub fn with_inode(mut self, inode: u32) -> Self {
        self.inode = inode;
        self
    }
}
