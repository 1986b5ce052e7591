//! Application layer
//!
//! Use cases that orchestrate the filesystem parser over a device.

pub mod dto;
mod list_directory;

pub use list_directory::ListDirectoryUseCase;
