//! List directory use case
//!
//! Opens the filesystem on a device and enumerates one directory.

use crate::application::dto::ListingOptions;
use crate::domain::entities::DirectoryEntry;
use crate::domain::repositories::{BlockDevice, FileSystemParser};
use crate::infrastructure::block_device::open_image;
use crate::infrastructure::file_systems::Ext4FileSystem;
use anyhow::{Context, Result};
use std::sync::Arc;

/// List directory use case
#[derive(Debug, Default)]
pub struct ListDirectoryUseCase;

impl ListDirectoryUseCase {
    pub fn new() -> Self {
        Self
    }

    /// Opens `options.device_path` and lists the requested directory
    pub fn execute(&self, options: &ListingOptions) -> Result<Vec<DirectoryEntry>> {
        let device = open_image(&options.device_path)
            .with_context(|| {
                format!("Failed to open device: {}", options.device_path.display())
            })?;
        self.execute_on(Arc::new(device), options)
    }

    /// Lists the requested directory on an already opened device
    pub fn execute_on<D: BlockDevice>(
        &self,
        device: Arc<D>,
        options: &ListingOptions,
    ) -> Result<Vec<DirectoryEntry>> {
        tracing::info!(
            "Reading ext4 metadata from {} ({} bytes)",
            device.path(),
            device.size()
        );

        let fs = Ext4FileSystem::open(device).context("Failed to read filesystem geometry")?;
        let entries = fs
            .list_directory(options.inode)
            .with_context(|| format!("Failed to list directory inode {}", options.inode))?;

        tracing::info!(
            "Listed {} entries from inode {}",
            entries.len(),
            options.inode
        );

        Ok(entries)
    }
}
