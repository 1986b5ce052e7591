//! File system parsers

pub mod ext4;

pub use ext4::Ext4FileSystem;
