//! Infrastructure layer
//!
//! Concrete implementations of the domain repositories: storage backends
//! and on-disk filesystem parsers.

pub mod block_device;
pub mod file_systems;
