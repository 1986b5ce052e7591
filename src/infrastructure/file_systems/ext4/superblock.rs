//! ext4 superblock decoding
//!
//! The superblock is the 1024-byte record at byte offset 1024 of the
//! filesystem. Only the geometry needed to walk metadata is decoded.

use super::bytes::{read_u16, read_u32};
use crate::domain::repositories::{BlockDevice, FileSystemError, SECTOR_SIZE};

/// ext4 superblock magic number
pub const EXT4_SUPER_MAGIC: u16 = 0xEF53;

/// Superblock offset from the start of the filesystem
pub const SUPERBLOCK_OFFSET: u64 = 1024;

/// Superblock size
pub const SUPERBLOCK_SIZE: usize = 1024;

/// Descriptor size implied when the on-disk field is zero
pub const DEFAULT_GDT_ENTRY_SIZE: u16 = 32;

/// Largest `log_block_size` accepted (64 MiB blocks)
const MAX_LOG_BLOCK_SIZE: u32 = 16;

const TOTAL_INODES_OFFSET: usize = 0x00;
const TOTAL_BLOCKS_OFFSET: usize = 0x04;
const LOG_BLOCK_SIZE_OFFSET: usize = 0x18;
const BLOCKS_PER_GROUP_OFFSET: usize = 0x20;
const INODES_PER_GROUP_OFFSET: usize = 0x28;
const MAGIC_OFFSET: usize = 0x38;
const INODE_SIZE_OFFSET: usize = 0x58;
const DESC_SIZE_OFFSET: usize = 0xFE;

/// Decoded ext4 superblock geometry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Superblock {
    /// Total inode count
    pub total_inodes: u32,
    /// Total block count (low 32 bits)
    pub total_blocks: u32,
    pub inodes_per_group: u32,
    pub blocks_per_group: u32,
    pub log_block_size: u32,
    /// Block size in bytes (1024 << log_block_size)
    pub block_size: u32,
    /// On-disk size of one inode record
    pub inode_record_size: u16,
    /// On-disk size of one group descriptor
    pub gdt_entry_size: u16,
    pub magic: u16,
    group_count: u64,
}

impl Superblock {
    /// Parses a superblock from its raw 1024 bytes
    ///
    /// Fails only when the group geometry is degenerate. The magic number is
    /// decoded but not enforced.
    pub fn parse(data: &[u8]) -> Result<Self, FileSystemError> {
        if data.len() < SUPERBLOCK_SIZE {
            return Err(FileSystemError::Format(format!(
                "superblock too small: {} bytes",
                data.len()
            )));
        }

        let total_inodes = read_u32(data, TOTAL_INODES_OFFSET)?;
        let total_blocks = read_u32(data, TOTAL_BLOCKS_OFFSET)?;
        let log_block_size = read_u32(data, LOG_BLOCK_SIZE_OFFSET)?;
        let blocks_per_group = read_u32(data, BLOCKS_PER_GROUP_OFFSET)?;
        let inodes_per_group = read_u32(data, INODES_PER_GROUP_OFFSET)?;
        let magic = read_u16(data, MAGIC_OFFSET)?;
        let inode_record_size = read_u16(data, INODE_SIZE_OFFSET)?;

        let gdt_entry_size = match read_u16(data, DESC_SIZE_OFFSET)? {
            0 => DEFAULT_GDT_ENTRY_SIZE,
            size => size,
        };

        if inodes_per_group == 0 || blocks_per_group == 0 {
            return Err(FileSystemError::Config(format!(
                "zero group size (inodes_per_group={}, blocks_per_group={})",
                inodes_per_group, blocks_per_group
            )));
        }

        if log_block_size > MAX_LOG_BLOCK_SIZE {
            return Err(FileSystemError::Config(format!(
                "log_block_size {} out of range",
                log_block_size
            )));
        }
        let block_size = 1024u32 << log_block_size;

        let group_count = u64::from(total_inodes.div_ceil(inodes_per_group))
            .max(u64::from(total_blocks.div_ceil(blocks_per_group)));

        Ok(Self {
            total_inodes,
            total_blocks,
            inodes_per_group,
            blocks_per_group,
            log_block_size,
            block_size,
            inode_record_size,
            gdt_entry_size,
            magic,
            group_count,
        })
    }

    /// Number of block groups, covering both the inode and block totals
    pub fn group_count(&self) -> u64 {
        self.group_count
    }

    /// Number of device sectors in one filesystem block
    pub fn sectors_per_block(&self) -> u64 {
        u64::from(self.block_size) / SECTOR_SIZE as u64
    }

    pub fn has_valid_magic(&self) -> bool {
        self.magic == EXT4_SUPER_MAGIC
    }
}

/// Reads and decodes the superblock from the third and fourth device sectors
pub fn read_superblock<D: BlockDevice + ?Sized>(device: &D) -> Result<Superblock, FileSystemError> {
    let data = device.read_sectors(
        SUPERBLOCK_OFFSET / SECTOR_SIZE as u64,
        (SUPERBLOCK_SIZE / SECTOR_SIZE) as u64,
    )?;
    let superblock = Superblock::parse(&data)?;

    if !superblock.has_valid_magic() {
        tracing::warn!(
            magic = %format!("{:#06x}", superblock.magic),
            "superblock magic is not ext2/3/4, continuing anyway"
        );
    }

    tracing::debug!(
        block_size = superblock.block_size,
        groups = superblock.group_count(),
        inodes_per_group = superblock.inodes_per_group,
        inode_size = superblock.inode_record_size,
        desc_size = superblock.gdt_entry_size,
        "parsed superblock"
    );

    Ok(superblock)
}
