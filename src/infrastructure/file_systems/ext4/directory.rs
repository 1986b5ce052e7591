//! Directory entry decoding
//!
//! A directory's data blocks form one stream of variable-length records:
//! inode (4), rec_len (2), name_len (1), file_type (1), then the name.
//! Scanning stops at the first zero `rec_len` or once the offset reaches the
//! smaller of the stream length and the inode's reported size.

use super::Ext4FileSystem;
use super::bytes::{field, read_u16, read_u32, read_u8};
use super::inode::InodeRecord;
use crate::domain::entities::{DirEntryFileType, DirectoryEntry};
use crate::domain::repositories::{BlockDevice, FileSystemError};

const DIR_ENTRY_HEADER_SIZE: usize = 8;

/// Decodes live entries from a directory's concatenated block data
///
/// Deleted slots (inode 0) are skipped. Names are decoded lossily, so
/// invalid UTF-8 never aborts enumeration.
pub fn decode_directory_stream(
    data: &[u8],
    reported_size: u64,
) -> Result<Vec<DirectoryEntry>, FileSystemError> {
    let limit = usize::try_from(reported_size)
        .unwrap_or(usize::MAX)
        .min(data.len());

    let mut entries = Vec::new();
    let mut offset = 0usize;

    while offset + DIR_ENTRY_HEADER_SIZE <= limit {
        let inode = read_u32(data, offset)?;
        let rec_len = usize::from(read_u16(data, offset + 4)?);
        let name_len = usize::from(read_u8(data, offset + 6)?);
        let file_type = read_u8(data, offset + 7)?;

        if rec_len == 0 {
            break;
        }

        if inode != 0 {
            let name = field(data, offset + DIR_ENTRY_HEADER_SIZE, name_len).map_err(|_| {
                FileSystemError::Format(format!(
                    "directory entry at offset {} has a {}-byte name past the end of its data",
                    offset, name_len
                ))
            })?;

            entries.push(DirectoryEntry::new(
                inode,
                String::from_utf8_lossy(name),
                DirEntryFileType::from_raw(file_type),
            ));
        }

        offset += rec_len;
    }

    tracing::debug!(
        entries = entries.len(),
        scanned = offset.min(limit),
        limit,
        "decoded directory stream"
    );

    Ok(entries)
}

/// Reads and decodes every live entry of a directory inode
pub fn read_directory<D: BlockDevice>(
    fs: &Ext4FileSystem<D>,
    inode: &InodeRecord,
) -> Result<Vec<DirectoryEntry>, FileSystemError> {
    let blocks = fs.resolve_blocks(inode)?;
    let data = fs.load_blocks(&blocks)?;
    decode_directory_stream(&data, u64::from(inode.size()?))
}
