//! Domain entities
//!
//! Core objects recovered from filesystem metadata.

mod block_list;
mod directory_entry;

pub use block_list::BlockList;
pub use directory_entry::{DirEntryFileType, DirectoryEntry};
