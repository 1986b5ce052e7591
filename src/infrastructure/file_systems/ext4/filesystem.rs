//! The ext4 filesystem context
//!
//! Built once per image from the superblock and group descriptor table,
//! then shared read-only by every lookup.

use super::block_map::resolve_block_list;
use super::directory::read_directory;
use super::group_descriptors::{GroupDescriptor, read_group_descriptors};
use super::inode::{InodeRecord, locate_inode};
use super::superblock::{Superblock, read_superblock};
use crate::domain::entities::{BlockList, DirectoryEntry};
use crate::domain::repositories::{
    BlockDevice, BlockDeviceError, FileSystemError, FileSystemParser,
};
use std::sync::Arc;

/// Immutable view of an ext4 filesystem on a block device
pub struct Ext4FileSystem<D: BlockDevice> {
    device: Arc<D>,
    superblock: Superblock,
    group_descriptors: Vec<GroupDescriptor>,
}

impl<D: BlockDevice> Ext4FileSystem<D> {
    /// Reads the superblock and group descriptors from `device`
    pub fn open(device: Arc<D>) -> Result<Self, FileSystemError> {
        let superblock = read_superblock(device.as_ref())?;
        let group_descriptors = read_group_descriptors(device.as_ref(), &superblock)?;

        Ok(Self {
            device,
            superblock,
            group_descriptors,
        })
    }

    #[cfg(test)]
    pub(crate) fn from_parts(
        device: Arc<D>,
        superblock: Superblock,
        group_descriptors: Vec<GroupDescriptor>,
    ) -> Self {
        Self {
            device,
            superblock,
            group_descriptors,
        }
    }

    pub fn superblock(&self) -> &Superblock {
        &self.superblock
    }

    pub fn group_descriptors(&self) -> &[GroupDescriptor] {
        &self.group_descriptors
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    /// Reads `count` consecutive filesystem blocks starting at `start`
    pub fn read_blocks(&self, start: u64, count: u64) -> Result<Vec<u8>, FileSystemError> {
        read_blocks(self.device.as_ref(), &self.superblock, start, count)
    }

    /// Reads the blocks of a block list and concatenates them in list order
    ///
    /// Physically adjacent blocks are fetched with a single device read.
    pub fn load_blocks(&self, blocks: &BlockList) -> Result<Vec<u8>, FileSystemError> {
        let block_size = self.superblock.block_size as usize;
        let mut data = Vec::with_capacity(blocks.len().saturating_mul(block_size));

        let mut iter = blocks.iter().copied().peekable();
        while let Some(start) = iter.next() {
            let mut count = 1u64;
            while let Some(&next) = iter.peek() {
                if start.checked_add(count) != Some(next) {
                    break;
                }
                iter.next();
                count += 1;
            }
            data.extend(self.read_blocks(start, count)?);
        }

        Ok(data)
    }

    pub fn read_inode(&self, number: u32) -> Result<InodeRecord, FileSystemError> {
        locate_inode(self, number)
    }

    pub fn resolve_blocks(&self, inode: &InodeRecord) -> Result<BlockList, FileSystemError> {
        resolve_block_list(self, inode)
    }

    pub fn read_directory(
        &self,
        inode: &InodeRecord,
    ) -> Result<Vec<DirectoryEntry>, FileSystemError> {
        read_directory(self, inode)
    }

    /// Reads an inode's data, truncated to its reported size
    pub fn read_contents(&self, inode: &InodeRecord) -> Result<Vec<u8>, FileSystemError> {
        let blocks = self.resolve_blocks(inode)?;
        let mut data = self.load_blocks(&blocks)?;
        data.truncate(inode.size()? as usize);
        Ok(data)
    }
}

impl<D: BlockDevice> FileSystemParser for Ext4FileSystem<D> {
    fn block_list(&self, inode: u32) -> Result<BlockList, FileSystemError> {
        let record = self.read_inode(inode)?;
        self.resolve_blocks(&record)
    }

    fn list_directory(&self, inode: u32) -> Result<Vec<DirectoryEntry>, FileSystemError> {
        let record = self.read_inode(inode)?;
        self.read_directory(&record)
    }

    fn read_file(&self, inode: u32) -> Result<Vec<u8>, FileSystemError> {
        let record = self.read_inode(inode)?;
        self.read_contents(&record)
    }
}

/// Reads whole filesystem blocks through the sector interface
pub(crate) fn read_blocks<D: BlockDevice + ?Sized>(
    device: &D,
    superblock: &Superblock,
    start: u64,
    count: u64,
) -> Result<Vec<u8>, FileSystemError> {
    let sectors_per_block = superblock.sectors_per_block();
    let overflow = || BlockDeviceError::InvalidOffset {
        offset: u64::MAX,
        device_size: device.size(),
    };

    let sector_offset = start.checked_mul(sectors_per_block).ok_or_else(overflow)?;
    let sector_count = count.checked_mul(sectors_per_block).ok_or_else(overflow)?;

    Ok(device.read_sectors(sector_offset, sector_count)?)
}
