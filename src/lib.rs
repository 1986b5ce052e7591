//! Read-only recovery of file and directory metadata from raw ext4 images.
//!
//! The crate walks superblock, group descriptors, inode tables, block maps
//! and directory records without ever writing to the device.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

pub use domain::entities::{BlockList, DirEntryFileType, DirectoryEntry};
pub use domain::repositories::{
    BlockDevice, BlockDeviceError, FileSystemError, FileSystemParser, SECTOR_SIZE,
};
pub use infrastructure::block_device::{
    FileBlockDevice, ImageDevice, MemoryBlockDevice, MmapBlockDevice, open_image,
};
pub use infrastructure::file_systems::ext4::{Ext4FileSystem, InodeRecord, ROOT_INODE};
