//! Unit-test access to the synthetic image builder under `tests/common`

use super::Ext4FileSystem;
use crate::infrastructure::block_device::MemoryBlockDevice;
use std::sync::Arc;

#[path = "../../../../tests/common/mod.rs"]
mod image;

pub(crate) use image::{
    ImageBuilder, SuperblockFields, extent_block_map, flat_block_map, inode_bytes, put_u16,
    put_u32,
};

/// Opens a built image as a filesystem over an in-memory device
pub(crate) trait OpenImage {
    fn open(self) -> Ext4FileSystem<MemoryBlockDevice>;
}

impl OpenImage for ImageBuilder {
    fn open(self) -> Ext4FileSystem<MemoryBlockDevice> {
        Ext4FileSystem::open(Arc::new(MemoryBlockDevice::new(self.build()))).unwrap()
    }
}
