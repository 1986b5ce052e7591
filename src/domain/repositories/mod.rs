//! Repository traits (interfaces)
//!
//! These traits define the contracts for storage access and filesystem
//! parsing. Concrete implementations live in the infrastructure layer.

mod block_device;
mod file_system;

pub use block_device::{BlockDevice, BlockDeviceError, SECTOR_SIZE, sector_span};
pub use file_system::{FileSystemError, FileSystemParser};
