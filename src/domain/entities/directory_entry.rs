//! Directory entry entity
//!
//! A single name-to-inode binding recovered from a directory's data blocks.

use std::fmt;

/// File type hint stored alongside each directory record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirEntryFileType {
    Unknown,
    RegularFile,
    Directory,
    CharDevice,
    BlockDevice,
    Fifo,
    Socket,
    Symlink,
}

impl DirEntryFileType {
    /// Decodes the on-disk `file_type` byte
    pub fn from_raw(value: u8) -> Self {
        match value {
            1 => Self::RegularFile,
            2 => Self::Directory,
            3 => Self::CharDevice,
            4 => Self::BlockDevice,
            5 => Self::Fifo,
            6 => Self::Socket,
            7 => Self::Symlink,
            _ => Self::Unknown,
        }
    }
}

/// A live entry of a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Inode number the name points to (never 0 for emitted entries)
    inode: u32,
    /// Entry name, lossily decoded from UTF-8
    name: String,
    /// File type hint from the record
    file_type: DirEntryFileType,
}

impl DirectoryEntry {
    pub fn new(inode: u32, name: impl Into<String>, file_type: DirEntryFileType) -> Self {
        Self {
            inode,
            name: name.into(),
            file_type,
        }
    }

    pub fn inode(&self) -> u32 {
        self.inode
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn file_type(&self) -> DirEntryFileType {
        self.file_type
    }

    /// Whether this is the `.` or `..` entry
    pub fn is_dot_entry(&self) -> bool {
        self.name == "." || self.name == ".."
    }
}

impl fmt::Display for DirectoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.inode)
    }
}
