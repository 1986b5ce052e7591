//! Block list entity
//!
//! The ordered physical block numbers backing one inode.

/// Ordered sequence of physical block numbers
///
/// Position in the list is the logical block position. Holes are never
/// stored, so a sparse file yields a shorter list rather than zero entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockList {
    blocks: Vec<u64>,
}

impl BlockList {
    /// Creates an empty block list
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a block, dropping the zero block number that marks a hole
    pub fn push(&mut self, block: u64) {
        if block != 0 {
            self.blocks.push(block);
        }
    }

    /// Appends `length` consecutive blocks starting at `start`
    pub fn push_run(&mut self, start: u64, length: u64) {
        self.blocks.reserve(length as usize);
        self.blocks
            .extend((0..length).filter_map(|i| start.checked_add(i)));
    }

    /// Number of blocks in the list
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, u64> {
        self.blocks.iter()
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.blocks
    }

    pub fn into_vec(self) -> Vec<u64> {
        self.blocks
    }
}

impl From<Vec<u64>> for BlockList {
    fn from(blocks: Vec<u64>) -> Self {
        let mut list = Self::new();
        list.extend(blocks);
        list
    }
}

impl Extend<u64> for BlockList {
    fn extend<I: IntoIterator<Item = u64>>(&mut self, iter: I) {
        for block in iter {
            self.push(block);
        }
    }
}

impl<'a> IntoIterator for &'a BlockList {
    type Item = &'a u64;
    type IntoIter = std::slice::Iter<'a, u64>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}
