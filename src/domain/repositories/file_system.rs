//! File system parser trait
//!
//! Defines the read-only interface for resolving metadata from a parsed
//! filesystem image.

use super::block_device::BlockDeviceError;
use crate::domain::entities::{BlockList, DirectoryEntry};
use thiserror::Error;

/// Errors that can occur when parsing a file system
///
/// Every error is fatal for the operation that raised it. There is no
/// partial result.
#[derive(Error, Debug)]
pub enum FileSystemError {
    /// Degenerate superblock geometry
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Structurally invalid on-disk record
    #[error("Invalid format: {0}")]
    Format(String),

    /// Valid on-disk structure this reader deliberately does not handle
    #[error("Unsupported feature: {0}")]
    UnsupportedFeature(String),

    /// Inode number outside the filesystem
    #[error("Out of range: {0}")]
    Range(String),

    #[error("Device error: {0}")]
    Device(#[from] BlockDeviceError),
}

/// Trait for resolving inode metadata from a filesystem
///
/// Implementations hold an immutable view of the filesystem geometry, so
/// every method takes `&self` and calls may run concurrently.
///
/// # Example
///
/// ```ignore
/// let fs = Ext4FileSystem::open(Arc::new(device))?;
/// for entry in fs.list_directory(ROOT_INODE)? {
///     println!("{}", entry);
/// }
/// ```
pub trait FileSystemParser: Send + Sync {
    /// Resolves the physical blocks backing an inode, in logical order
    fn block_list(&self, inode: u32) -> Result<BlockList, FileSystemError>;

    /// Enumerates the live entries of a directory inode
    fn list_directory(&self, inode: u32) -> Result<Vec<DirectoryEntry>, FileSystemError>;

    /// Reads the contents of an inode, truncated to its reported size
    fn read_file(&self, inode: u32) -> Result<Vec<u8>, FileSystemError>;
}
