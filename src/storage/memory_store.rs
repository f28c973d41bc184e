//! In-memory block store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::common::{BlockId, Error, Result};
use crate::storage::page::Page;

use super::BlockStore;

/// A [`BlockStore`] that keeps every file in memory.
///
/// Counts every read, write and append, which makes it the store of choice
/// for asserting exactly which I/O the buffer pool performed.
#[derive(Default)]
pub struct MemoryBlockStore {
    files: Mutex<HashMap<String, Vec<Box<Page>>>>,
    reads: AtomicU64,
    writes: AtomicU64,
    appends: AtomicU64,
}

impl MemoryBlockStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful reads so far.
    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    /// Number of successful writes so far.
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    /// Number of successful appends so far.
    pub fn appends(&self) -> u64 {
        self.appends.load(Ordering::Relaxed)
    }
}

impl BlockStore for MemoryBlockStore {
    fn read(&self, block: &BlockId) -> Result<Page> {
        let files = self.files.lock();
        let stored = files
            .get(block.file_name())
            .and_then(|blocks| blocks.get(block.number() as usize))
            .ok_or_else(|| Error::BlockNotFound(block.clone()))?;

        let mut page = Page::new();
        page.copy_from(stored);
        self.reads.fetch_add(1, Ordering::Relaxed);
        Ok(page)
    }

    fn write(&self, block: &BlockId, page: &Page) -> Result<()> {
        let mut files = self.files.lock();
        let stored = files
            .get_mut(block.file_name())
            .and_then(|blocks| blocks.get_mut(block.number() as usize))
            .ok_or_else(|| Error::BlockNotFound(block.clone()))?;

        stored.copy_from(page);
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn append(&self, file_name: &str) -> Result<BlockId> {
        let mut files = self.files.lock();
        let blocks = files.entry(file_name.to_string()).or_default();
        blocks.push(Box::default());

        self.appends.fetch_add(1, Ordering::Relaxed);
        Ok(BlockId::new(file_name, (blocks.len() - 1) as u32))
    }

    fn block_count(&self, file_name: &str) -> Result<u32> {
        Ok(self
            .files
            .lock()
            .get(file_name)
            .map_or(0, |blocks| blocks.len() as u32))
    }
}
