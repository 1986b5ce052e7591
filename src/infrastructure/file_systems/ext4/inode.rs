//! Inode lookup
//!
//! Maps a 1-based inode number onto its group's inode table and slices the
//! raw record out. Fields are decoded lazily from the record bytes.

use super::Ext4FileSystem;
use super::bytes::{field, read_u16, read_u32};
use super::superblock::Superblock;
use crate::domain::repositories::{BlockDevice, FileSystemError};

/// Inode number of the root directory
pub const ROOT_INODE: u32 = 2;

/// Inode flag marking an extent-mapped inode
pub const EXTENTS_FLAG: u32 = 0x80000;

/// Offset of the 60-byte block pointer / extent region
pub const BLOCK_MAP_OFFSET: usize = 0x28;

/// Size of the block pointer / extent region
pub const BLOCK_MAP_SIZE: usize = 60;

const MODE_OFFSET: usize = 0x00;
const SIZE_OFFSET: usize = 0x04;
const FLAGS_OFFSET: usize = 0x20;

const S_IFMT: u16 = 0xF000;
const S_IFDIR: u16 = 0x4000;

/// Raw on-disk inode record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InodeRecord {
    number: u32,
    bytes: Vec<u8>,
}

impl InodeRecord {
    pub fn new(number: u32, bytes: Vec<u8>) -> Self {
        Self { number, bytes }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// `i_mode`: file type and permission bits
    pub fn mode(&self) -> Result<u16, FileSystemError> {
        read_u16(&self.bytes, MODE_OFFSET)
    }

    /// Reported size in bytes (low 32 bits)
    pub fn size(&self) -> Result<u32, FileSystemError> {
        read_u32(&self.bytes, SIZE_OFFSET)
    }

    pub fn flags(&self) -> Result<u32, FileSystemError> {
        read_u32(&self.bytes, FLAGS_OFFSET)
    }

    pub fn uses_extents(&self) -> Result<bool, FileSystemError> {
        Ok(self.flags()? & EXTENTS_FLAG != 0)
    }

    pub fn is_directory(&self) -> Result<bool, FileSystemError> {
        Ok(self.mode()? & S_IFMT == S_IFDIR)
    }

    /// The 60-byte region holding block pointers or the inline extent tree
    pub fn block_map(&self) -> Result<&[u8], FileSystemError> {
        field(&self.bytes, BLOCK_MAP_OFFSET, BLOCK_MAP_SIZE)
    }
}

/// Position of an inode within the filesystem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InodeLocation {
    pub group: u64,
    /// Index of the record inside the group's inode table
    pub index: u64,
}

/// Computes the group and table index of inode `number`
pub fn inode_location(superblock: &Superblock, number: u32) -> Result<InodeLocation, FileSystemError> {
    if number == 0 {
        return Err(FileSystemError::Range(
            "inode numbers start at 1".to_string(),
        ));
    }

    let zero_based = u64::from(number - 1);
    let per_group = u64::from(superblock.inodes_per_group);
    let location = InodeLocation {
        group: zero_based / per_group,
        index: zero_based % per_group,
    };

    if location.group >= superblock.group_count() {
        return Err(FileSystemError::Range(format!(
            "inode {} falls in group {}, filesystem has {}",
            number,
            location.group,
            superblock.group_count()
        )));
    }

    Ok(location)
}

/// Number of blocks occupied by one group's inode table
pub fn inode_table_block_count(superblock: &Superblock) -> u64 {
    let table_bytes =
        u64::from(superblock.inode_record_size) * u64::from(superblock.inodes_per_group);
    table_bytes.div_ceil(u64::from(superblock.block_size))
}

/// Reads the raw record of inode `number`
pub fn locate_inode<D: BlockDevice>(
    fs: &Ext4FileSystem<D>,
    number: u32,
) -> Result<InodeRecord, FileSystemError> {
    let superblock = fs.superblock();
    let location = inode_location(superblock, number)?;
    let table_start = fs
        .group_descriptors()
        .get(location.group as usize)
        .map(|descriptor| descriptor.inode_table_start)
        .ok_or_else(|| FileSystemError::Range(format!("no descriptor for group {}", location.group)))?;

    let table = fs.read_blocks(table_start, inode_table_block_count(superblock))?;

    let record_size = usize::from(superblock.inode_record_size);
    let offset = location.index as usize * record_size;
    let bytes = field(&table, offset, record_size)?.to_vec();

    tracing::debug!(
        inode = number,
        group = location.group,
        index = location.index,
        table_block = table_start,
        "located inode"
    );

    Ok(InodeRecord::new(number, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{BlockDeviceError, SECTOR_SIZE};
    use crate::infrastructure::file_systems::ext4::group_descriptors::GroupDescriptor;
    use crate::infrastructure::file_systems::ext4::test_support::{
        ImageBuilder, OpenImage, SuperblockFields, flat_block_map, inode_bytes, put_u16,
    };
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Serves zeroes for any read and remembers what was asked for
    struct RecordingDevice {
        reads: Mutex<Vec<(u64, u64)>>,
    }

    impl BlockDevice for RecordingDevice {
        fn read_sectors(
            &self,
            sector_offset: u64,
            sector_count: u64,
        ) -> Result<Vec<u8>, BlockDeviceError> {
            self.reads.lock().push((sector_offset, sector_count));
            Ok(vec![0u8; sector_count as usize * SECTOR_SIZE])
        }

        fn path(&self) -> &str {
            "<recording>"
        }

        fn size(&self) -> u64 {
            u64::MAX
        }
    }

    fn superblock() -> Superblock {
        Superblock::parse(&SuperblockFields::default().to_bytes()).unwrap()
    }

    #[test]
    fn test_inode_zero_is_range_error() {
        assert!(matches!(
            inode_location(&superblock(), 0),
            Err(FileSystemError::Range(_))
        ));
    }

    #[test]
    fn test_inode_past_last_group_is_range_error() {
        // One group of 16 inodes
        assert!(inode_location(&superblock(), 16).is_ok());
        assert!(matches!(
            inode_location(&superblock(), 17),
            Err(FileSystemError::Range(_))
        ));
    }

    #[test]
    fn test_inode_location_math() {
        let sb = Superblock::parse(
            &SuperblockFields {
                total_inodes: 64,
                ..SuperblockFields::default()
            }
            .to_bytes(),
        )
        .unwrap();

        assert_eq!(
            inode_location(&sb, 1).unwrap(),
            InodeLocation { group: 0, index: 0 }
        );
        assert_eq!(
            inode_location(&sb, 17).unwrap(),
            InodeLocation { group: 1, index: 0 }
        );
        assert_eq!(
            inode_location(&sb, 40).unwrap(),
            InodeLocation { group: 2, index: 7 }
        );
    }

    #[test]
    fn test_inode_table_block_count() {
        // 16 * 128 bytes = 2 KiB over 1 KiB blocks
        assert_eq!(inode_table_block_count(&superblock()), 2);

        let sb = Superblock::parse(
            &SuperblockFields {
                inodes_per_group: 20,
                total_inodes: 20,
                ..SuperblockFields::default()
            }
            .to_bytes(),
        )
        .unwrap();
        assert_eq!(inode_table_block_count(&sb), 3);
    }

    #[test]
    fn test_locate_reads_64bit_inode_table() {
        let device = Arc::new(RecordingDevice {
            reads: Mutex::new(Vec::new()),
        });
        let groups = vec![GroupDescriptor {
            inode_table_start: 0x1_0000_0100,
        }];
        let fs = Ext4FileSystem::from_parts(Arc::clone(&device), superblock(), groups);

        let record = locate_inode(&fs, 2).unwrap();
        assert_eq!(record.as_bytes().len(), 128);

        // 1 KiB blocks are two sectors each
        assert_eq!(
            device.reads.lock().as_slice(),
            &[(0x1_0000_0100 * 2, 4)]
        );
    }

    #[test]
    fn test_locate_slices_correct_record() {
        let mut image = ImageBuilder::new(SuperblockFields::default());
        let record = inode_bytes(0, 4242, &flat_block_map(&[20]));
        image.write_inode(12, &record);
        let fs = image.open();

        let inode = locate_inode(&fs, 12).unwrap();
        assert_eq!(inode.number(), 12);
        assert_eq!(inode.size().unwrap(), 4242);
        assert_eq!(inode.as_bytes(), record.as_slice());
    }

    #[test]
    fn test_record_accessors() {
        let mut bytes = inode_bytes(EXTENTS_FLAG, 1024, &[0u8; BLOCK_MAP_SIZE]);
        put_u16(&mut bytes, 0, 0x41ED);
        let inode = InodeRecord::new(2, bytes);

        assert!(inode.uses_extents().unwrap());
        assert!(inode.is_directory().unwrap());
        assert_eq!(inode.flags().unwrap(), EXTENTS_FLAG);
        assert_eq!(inode.block_map().unwrap().len(), BLOCK_MAP_SIZE);
    }

    #[test]
    fn test_short_record_is_format_error() {
        let inode = InodeRecord::new(3, vec![0u8; 64]);
        assert!(inode.size().is_ok());
        assert!(matches!(inode.block_map(), Err(FileSystemError::Format(_))));
    }
}
