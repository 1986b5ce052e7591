//! ext4 filesystem parser
//!
//! Walks ext4 metadata read-only: superblock, group descriptors, inode
//! tables, block maps and directory records.

pub mod block_map;
mod bytes;
pub mod directory;
mod filesystem;
pub mod group_descriptors;
pub mod inode;
pub mod superblock;

#[cfg(test)]
pub(crate) mod test_support;

pub use block_map::{Extent, ExtentHeader, MAX_INDIRECTION_DEPTH, MAX_INLINE_EXTENTS};
pub use filesystem::Ext4FileSystem;
pub use group_descriptors::GroupDescriptor;
pub use inode::{InodeRecord, ROOT_INODE};
pub use superblock::Superblock;
