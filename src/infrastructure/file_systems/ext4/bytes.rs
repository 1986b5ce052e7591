//! Bounds-checked little-endian field reads over raw on-disk records

use crate::domain::repositories::FileSystemError;
use byteorder::{ByteOrder, LittleEndian};

/// Borrows `len` bytes at `offset`, failing instead of panicking on truncation
pub(crate) fn field(data: &[u8], offset: usize, len: usize) -> Result<&[u8], FileSystemError> {
    offset
        .checked_add(len)
        .and_then(|end| data.get(offset..end))
        .ok_or_else(|| {
            FileSystemError::Format(format!(
                "record truncated: need {} bytes at offset {:#x}, have {}",
                len,
                offset,
                data.len()
            ))
        })
}

pub(crate) fn read_u8(data: &[u8], offset: usize) -> Result<u8, FileSystemError> {
    Ok(field(data, offset, 1)?[0])
}

pub(crate) fn read_u16(data: &[u8], offset: usize) -> Result<u16, FileSystemError> {
    field(data, offset, 2).map(LittleEndian::read_u16)
}

pub(crate) fn read_u32(data: &[u8], offset: usize) -> Result<u32, FileSystemError> {
    field(data, offset, 4).map(LittleEndian::read_u32)
}
