//! Logical-to-physical block resolution
//!
//! An inode's 60-byte block map is either fifteen classic block pointers
//! (12 direct, then single, double and triple indirect) or an inline extent
//! tree. Both forms flatten into the same [`BlockList`].
//!
//! Only leaf extent nodes held inside the inode are supported. Index nodes
//! would need further block reads and are rejected.
//!
//! Large triple-indirect files materialize their whole block list in memory.
//! Callers that need bounded memory must walk the pointer blocks themselves.

use super::Ext4FileSystem;
use super::bytes::{read_u16, read_u32};
use super::inode::{BLOCK_MAP_SIZE, InodeRecord};
use crate::domain::entities::BlockList;
use crate::domain::repositories::{BlockDevice, FileSystemError};
use byteorder::{ByteOrder, LittleEndian};

/// Levels of indirection in the classic block map
pub const MAX_INDIRECTION_DEPTH: u8 = 3;

/// Number of direct pointers before the indirect ones
pub const DIRECT_POINTERS: usize = 12;

/// Total pointers in the classic block map
pub const BLOCK_POINTERS: usize = 15;

/// Extent header magic number
pub const EXTENT_MAGIC: u16 = 0xF30A;

/// Extent records that fit in the inode after the header
pub const MAX_INLINE_EXTENTS: u16 = 4;

const EXTENT_HEADER_SIZE: usize = 12;
const EXTENT_RECORD_SIZE: usize = 12;
const EXTENT_LEN_MASK: u16 = 0x7FFF;
const EXTENT_UNINIT_FLAG: u16 = 0x8000;

/// Pointer slot and indirection depth of each indirect pointer
const INDIRECT_SLOTS: [(usize, u8); 3] = [(12, 1), (13, 2), (14, MAX_INDIRECTION_DEPTH)];

/// Inline extent tree header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtentHeader {
    pub magic: u16,
    pub entries: u16,
    pub max_entries: u16,
    pub depth: u16,
}

/// A run of physically contiguous blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    /// First logical block covered (informational only)
    pub logical_block: u32,
    /// On-disk length field, including the uninitialized flag bit
    pub raw_len: u16,
    pub physical_start: u64,
}

impl Extent {
    /// Number of blocks in the run
    pub fn len(&self) -> u16 {
        self.raw_len & EXTENT_LEN_MASK
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the extent is flagged as allocated but unwritten
    ///
    /// The flag is reported but does not change resolution: the run is
    /// returned like any other.
    pub fn is_uninitialized(&self) -> bool {
        self.raw_len & EXTENT_UNINIT_FLAG != 0
    }
}

/// Decodes the extent header at the start of a block map region
pub fn parse_extent_header(region: &[u8]) -> Result<ExtentHeader, FileSystemError> {
    Ok(ExtentHeader {
        magic: read_u16(region, 0)?,
        entries: read_u16(region, 2)?,
        max_entries: read_u16(region, 4)?,
        depth: read_u16(region, 6)?,
    })
}

/// Parses the leaf extents stored inline in a block map region
pub fn parse_inline_extents(region: &[u8]) -> Result<Vec<Extent>, FileSystemError> {
    let header = parse_extent_header(region)?;

    if header.magic != EXTENT_MAGIC {
        return Err(FileSystemError::Format(format!(
            "invalid extent header magic {:#06x}",
            header.magic
        )));
    }
    if header.depth != 0 {
        return Err(FileSystemError::UnsupportedFeature(format!(
            "extent tree of depth {} (only inline leaf nodes are read)",
            header.depth
        )));
    }
    if header.entries > MAX_INLINE_EXTENTS {
        return Err(FileSystemError::UnsupportedFeature(format!(
            "{} extents exceed the inline capacity of {}",
            header.entries, MAX_INLINE_EXTENTS
        )));
    }

    (0..usize::from(header.entries))
        .map(|i| {
            let base = EXTENT_HEADER_SIZE + i * EXTENT_RECORD_SIZE;
            let start_hi = u64::from(read_u16(region, base + 6)?);
            let start_lo = u64::from(read_u32(region, base + 8)?);

            Ok(Extent {
                logical_block: read_u32(region, base)?,
                raw_len: read_u16(region, base + 4)?,
                physical_start: (start_hi << 32) | start_lo,
            })
        })
        .collect()
}

/// Non-zero 32-bit block pointers in a pointer block, in array order
pub fn pointer_entries(block: &[u8]) -> impl Iterator<Item = u64> + '_ {
    block
        .chunks_exact(4)
        .map(LittleEndian::read_u32)
        .filter(|&ptr| ptr != 0)
        .map(u64::from)
}

/// Resolves an inode's physical blocks in logical order
pub fn resolve_block_list<D: BlockDevice>(
    fs: &Ext4FileSystem<D>,
    inode: &InodeRecord,
) -> Result<BlockList, FileSystemError> {
    let extents = inode.uses_extents()?;
    let blocks = if extents {
        resolve_extents(inode)?
    } else {
        resolve_indirect(fs, inode)?
    };

    tracing::debug!(
        inode = inode.number(),
        mapping = if extents { "extents" } else { "indirect" },
        blocks = blocks.len(),
        "resolved block list"
    );

    Ok(blocks)
}

fn resolve_extents(inode: &InodeRecord) -> Result<BlockList, FileSystemError> {
    let mut blocks = BlockList::new();

    for extent in parse_inline_extents(inode.block_map()?)? {
        if extent.is_uninitialized() {
            tracing::warn!(
                inode = inode.number(),
                logical_block = extent.logical_block,
                "uninitialized extent read as regular data"
            );
        }
        blocks.push_run(extent.physical_start, u64::from(extent.len()));
    }

    Ok(blocks)
}

/// A pointer block still to be expanded
struct PendingBlock {
    block: u64,
    /// 1 when the block's entries are data blocks
    depth: u8,
}

fn resolve_indirect<D: BlockDevice>(
    fs: &Ext4FileSystem<D>,
    inode: &InodeRecord,
) -> Result<BlockList, FileSystemError> {
    let region = inode.block_map()?;
    debug_assert_eq!(region.len(), BLOCK_MAP_SIZE);

    let pointers: Vec<u32> = region
        .chunks_exact(4)
        .take(BLOCK_POINTERS)
        .map(LittleEndian::read_u32)
        .collect();

    let mut blocks = BlockList::new();
    blocks.extend(pointers[..DIRECT_POINTERS].iter().copied().map(u64::from));

    // Stack ordered so the leftmost pending block is always expanded first
    let mut pending: Vec<PendingBlock> = INDIRECT_SLOTS
        .iter()
        .rev()
        .filter(|&&(slot, _)| pointers[slot] != 0)
        .map(|&(slot, depth)| PendingBlock {
            block: u64::from(pointers[slot]),
            depth,
        })
        .collect();

    while let Some(PendingBlock { block, depth }) = pending.pop() {
        debug_assert!((1..=MAX_INDIRECTION_DEPTH).contains(&depth));
        let data = fs.read_blocks(block, 1)?;

        if depth == 1 {
            blocks.extend(pointer_entries(&data));
        } else {
            let children: Vec<u64> = pointer_entries(&data).collect();
            pending.extend(children.into_iter().rev().map(|child| PendingBlock {
                block: child,
                depth: depth - 1,
            }));
        }
    }

    Ok(blocks)
}
