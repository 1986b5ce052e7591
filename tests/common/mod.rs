//! Synthetic ext4 image construction
//!
//! Shared by the integration tests and, through `ext4::test_support`, by the
//! unit tests. Only std is used here so both crates can compile it.

#![allow(dead_code)]

pub const EXTENTS_FLAG: u32 = 0x80000;
pub const S_IFDIR: u16 = 0x4000;
pub const S_IFREG: u16 = 0x8000;

pub const FT_REG_FILE: u8 = 1;
pub const FT_DIR: u8 = 2;

const SUPERBLOCK_OFFSET: usize = 1024;
const SUPERBLOCK_SIZE: usize = 1024;
const BLOCK_MAP_OFFSET: usize = 0x28;
const BLOCK_MAP_SIZE: usize = 60;

pub fn put_u16(buf: &mut [u8], offset: usize, value: u16) {
    buf[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

pub fn put_u32(buf: &mut [u8], offset: usize, value: u32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

/// Superblock fields a test cares about
#[derive(Debug, Clone)]
pub struct SuperblockFields {
    pub log_block_size: u32,
    pub total_inodes: u32,
    pub total_blocks: u32,
    pub inodes_per_group: u32,
    pub blocks_per_group: u32,
    pub inode_size: u16,
    /// Raw on-disk descriptor size; 0 means the 32-byte default
    pub desc_size: u16,
}

impl Default for SuperblockFields {
    fn default() -> Self {
        Self {
            log_block_size: 0,
            total_inodes: 16,
            total_blocks: 64,
            inodes_per_group: 16,
            blocks_per_group: 8192,
            inode_size: 128,
            desc_size: 0,
        }
    }
}

impl SuperblockFields {
    /// The raw 1024-byte superblock
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut sb = vec![0u8; SUPERBLOCK_SIZE];
        put_u32(&mut sb, 0x00, self.total_inodes);
        put_u32(&mut sb, 0x04, self.total_blocks);
        put_u32(&mut sb, 0x18, self.log_block_size);
        put_u32(&mut sb, 0x20, self.blocks_per_group);
        put_u32(&mut sb, 0x28, self.inodes_per_group);
        put_u16(&mut sb, 0x38, 0xEF53);
        put_u16(&mut sb, 0x58, self.inode_size);
        put_u16(&mut sb, 0xFE, self.desc_size);
        sb
    }

    pub fn block_size(&self) -> usize {
        1024 << self.log_block_size
    }

    fn group_count(&self) -> usize {
        let by_inodes = self.total_inodes.div_ceil(self.inodes_per_group);
        let by_blocks = self.total_blocks.div_ceil(self.blocks_per_group);
        by_inodes.max(by_blocks) as usize
    }
}

/// Builds an ext4-shaped image in memory
///
/// Every group gets its own inode table right after the descriptor table.
/// Data blocks handed out by `alloc_block` follow the last table.
pub struct ImageBuilder {
    bytes: Vec<u8>,
    fields: SuperblockFields,
    table_starts: Vec<u64>,
    next_free: u64,
}

impl ImageBuilder {
    pub fn new(fields: SuperblockFields) -> Self {
        let block_size = fields.block_size();
        let groups = fields.group_count();
        let mut bytes = vec![0u8; block_size * fields.total_blocks as usize];

        bytes[SUPERBLOCK_OFFSET..SUPERBLOCK_OFFSET + SUPERBLOCK_SIZE]
            .copy_from_slice(&fields.to_bytes());

        let stride = match fields.desc_size {
            0 => 32,
            size => size as usize,
        };
        let gdt_block = if block_size == 1024 { 2 } else { 1 };
        let gdt_blocks = (stride * groups).div_ceil(block_size) as u64;
        let table_blocks = (fields.inode_size as usize * fields.inodes_per_group as usize)
            .div_ceil(block_size) as u64;

        let first_table = gdt_block + gdt_blocks + 1;
        let table_starts: Vec<u64> = (0..groups as u64)
            .map(|g| first_table + g * table_blocks)
            .collect();

        for (g, &start) in table_starts.iter().enumerate() {
            let entry = gdt_block as usize * block_size + g * stride;
            put_u32(&mut bytes, entry + 0x08, start as u32);
        }

        let next_free = first_table + groups as u64 * table_blocks + 1;
        assert!(next_free < fields.total_blocks as u64, "image too small");

        Self {
            bytes,
            fields,
            table_starts,
            next_free,
        }
    }

    pub fn block_size(&self) -> usize {
        self.fields.block_size()
    }

    /// First block of `group`'s inode table
    pub fn inode_table_start(&self, group: usize) -> u64 {
        self.table_starts[group]
    }

    /// Hands out the next unused data block
    pub fn alloc_block(&mut self) -> u64 {
        let block = self.next_free;
        self.next_free += 1;
        assert!(block < self.fields.total_blocks as u64, "out of blocks");
        block
    }

    /// Hands out `count` consecutive unused data blocks
    pub fn alloc_run(&mut self, count: u64) -> u64 {
        let start = self.next_free;
        for _ in 0..count {
            self.alloc_block();
        }
        start
    }

    pub fn block_mut(&mut self, block: u64) -> &mut [u8] {
        let block_size = self.block_size();
        let start = block as usize * block_size;
        &mut self.bytes[start..start + block_size]
    }

    pub fn write_block(&mut self, block: u64, data: &[u8]) {
        self.block_mut(block)[..data.len()].copy_from_slice(data);
    }

    /// Fills a block with 32-bit block pointers, leaving the rest zeroed
    pub fn write_pointers(&mut self, block: u64, pointers: &[u32]) {
        let data = self.block_mut(block);
        for (i, &ptr) in pointers.iter().enumerate() {
            put_u32(data, i * 4, ptr);
        }
    }

    /// Places a raw record in the inode table slot of `number`
    pub fn write_inode(&mut self, number: u32, record: &[u8]) {
        let index = (number - 1) as usize;
        let ipg = self.fields.inodes_per_group as usize;
        let table = self.table_starts[index / ipg] as usize;
        let start = table * self.block_size() + (index % ipg) * self.fields.inode_size as usize;
        self.bytes[start..start + record.len()].copy_from_slice(record);
    }

    pub fn set_inode(&mut self, number: u32, mode: u16, flags: u32, size: u32, block_map: &[u8; 60]) {
        let mut record = inode_bytes(flags, size, block_map);
        record.resize(self.fields.inode_size as usize, 0);
        put_u16(&mut record, 0x00, mode);
        self.write_inode(number, &record);
    }

    pub fn add_flat_inode(&mut self, number: u32, mode: u16, size: u32, pointers: &[u32]) {
        self.set_inode(number, mode, 0, size, &flat_block_map(pointers));
    }

    pub fn add_extent_inode(&mut self, number: u32, mode: u16, size: u32, extents: &[(u32, u16, u64)]) {
        self.set_inode(number, mode, EXTENTS_FLAG, size, &extent_block_map(0, extents));
    }

    /// Lays directory records into one block, stretching the last to the end
    pub fn dir_block(&self, entries: &[(u32, &str, u8)]) -> Vec<u8> {
        dir_records(entries, self.block_size())
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

/// A 128-byte inode record with the given flags, size and block map
pub fn inode_bytes(flags: u32, size: u32, block_map: &[u8; BLOCK_MAP_SIZE]) -> Vec<u8> {
    let mut inode = vec![0u8; 128];
    put_u32(&mut inode, 0x04, size);
    put_u32(&mut inode, 0x20, flags);
    inode[BLOCK_MAP_OFFSET..BLOCK_MAP_OFFSET + BLOCK_MAP_SIZE].copy_from_slice(block_map);
    inode
}

/// Block map holding classic direct/indirect pointers
pub fn flat_block_map(pointers: &[u32]) -> [u8; BLOCK_MAP_SIZE] {
    let mut map = [0u8; BLOCK_MAP_SIZE];
    for (i, &ptr) in pointers.iter().take(15).enumerate() {
        put_u32(&mut map, i * 4, ptr);
    }
    map
}

/// Block map holding an inline extent header and `(logical, len, physical)` records
pub fn extent_block_map(depth: u16, extents: &[(u32, u16, u64)]) -> [u8; BLOCK_MAP_SIZE] {
    let mut map = [0u8; BLOCK_MAP_SIZE];
    put_u16(&mut map, 0, 0xF30A);
    put_u16(&mut map, 2, extents.len() as u16);
    put_u16(&mut map, 4, 4);
    put_u16(&mut map, 6, depth);

    for (i, &(logical, len, physical)) in extents.iter().take(4).enumerate() {
        let base = 12 + i * 12;
        put_u32(&mut map, base, logical);
        put_u16(&mut map, base + 4, len);
        put_u16(&mut map, base + 6, (physical >> 32) as u16);
        put_u32(&mut map, base + 8, physical as u32);
    }
    map
}

/// Encodes directory records filling exactly `span` bytes
pub fn dir_records(entries: &[(u32, &str, u8)], span: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(span);
    for (i, &(inode, name, file_type)) in entries.iter().enumerate() {
        let natural = (8 + name.len()).div_ceil(4) * 4;
        let rec_len = if i + 1 == entries.len() {
            span - out.len()
        } else {
            natural
        };
        let start = out.len();
        out.extend_from_slice(&inode.to_le_bytes());
        out.extend_from_slice(&(rec_len as u16).to_le_bytes());
        out.push(name.len() as u8);
        out.push(file_type);
        out.extend_from_slice(name.as_bytes());
        out.resize(start + rec_len, 0);
    }
    out.resize(span, 0);
    out
}
