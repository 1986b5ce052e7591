//! Block group descriptor table
//!
//! Locates the GDT right after the superblock's block and extracts each
//! group's inode table address.

use super::bytes::{read_u16, read_u32};
use super::filesystem::read_blocks;
use super::superblock::Superblock;
use crate::domain::repositories::{BlockDevice, FileSystemError};

/// Descriptor size from which the 64-bit high halves are present
pub const GDT_64BIT_MIN_ENTRY_SIZE: u16 = 64;

const INODE_TABLE_LO_OFFSET: usize = 0x08;
const INODE_TABLE_HI_OFFSET: usize = 0x28;

/// Per-group metadata needed to find inodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupDescriptor {
    /// First block of this group's inode table
    pub inode_table_start: u64,
}

/// Block number where the descriptor table begins
///
/// With 1 KiB blocks the superblock fills block 1, so the table starts at
/// block 2. Larger blocks hold the superblock inside block 0.
pub fn gdt_start_block(superblock: &Superblock) -> u64 {
    if superblock.block_size == 1024 { 2 } else { 1 }
}

/// Number of whole blocks spanned by the descriptor table
pub fn gdt_block_count(superblock: &Superblock) -> u64 {
    let table_bytes = u64::from(superblock.gdt_entry_size) * superblock.group_count();
    table_bytes.div_ceil(u64::from(superblock.block_size))
}

/// Decodes every group's descriptor out of the raw table bytes
pub fn parse_group_descriptors(
    table: &[u8],
    superblock: &Superblock,
) -> Result<Vec<GroupDescriptor>, FileSystemError> {
    let stride = usize::from(superblock.gdt_entry_size);
    let wide = superblock.gdt_entry_size >= GDT_64BIT_MIN_ENTRY_SIZE;

    (0..superblock.group_count() as usize)
        .map(|group| {
            let base = group * stride;
            let low = u64::from(read_u32(table, base + INODE_TABLE_LO_OFFSET)?);
            let high = if wide {
                u64::from(read_u16(table, base + INODE_TABLE_HI_OFFSET)?)
            } else {
                0
            };

            Ok(GroupDescriptor {
                inode_table_start: (high << 32) | low,
            })
        })
        .collect()
}

/// Reads and decodes the group descriptor table
pub fn read_group_descriptors<D: BlockDevice + ?Sized>(
    device: &D,
    superblock: &Superblock,
) -> Result<Vec<GroupDescriptor>, FileSystemError> {
    let start = gdt_start_block(superblock);
    let count = gdt_block_count(superblock);
    let table = read_blocks(device, superblock, start, count)?;

    let descriptors = parse_group_descriptors(&table, superblock)?;
    tracing::debug!(
        start_block = start,
        blocks = count,
        groups = descriptors.len(),
        "parsed group descriptor table"
    );

    Ok(descriptors)
}
