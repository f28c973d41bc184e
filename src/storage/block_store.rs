//! The block store contract consumed by the buffer pool.

use std::sync::Arc;

use crate::common::{BlockId, Result};

use super::page::Page;

/// Durable storage of fixed-size blocks grouped into named files.
///
/// The buffer pool serializes its own calls, but a store may be shared by
/// several pools or inspected by other threads, so methods take `&self` and
/// implementations synchronize internally.
///
/// Failures surface as [`Error::Io`](crate::Error::Io), or
/// [`Error::BlockNotFound`](crate::Error::BlockNotFound) when a block lies
/// past the end of its file.
pub trait BlockStore: Send + Sync {
    /// Read the contents of `block`.
    fn read(&self, block: &BlockId) -> Result<Page>;

    /// Overwrite `block` with `page`. The block must already exist.
    fn write(&self, block: &BlockId, page: &Page) -> Result<()>;

    /// Extend `file_name` by one zeroed block and return its identity.
    fn append(&self, file_name: &str) -> Result<BlockId>;

    /// Number of blocks currently in `file_name` (0 if it does not exist).
    fn block_count(&self, file_name: &str) -> Result<u32>;
}

impl<T: BlockStore + ?Sized> BlockStore for Arc<T> {
    fn read(&self, block: &BlockId) -> Result<Page> {
        (**self).read(block)
    }

    fn write(&self, block: &BlockId, page: &Page) -> Result<()> {
        (**self).write(block, page)
    }

    fn append(&self, file_name: &str) -> Result<BlockId> {
        (**self).append(file_name)
    }

    fn block_count(&self, file_name: &str) -> Result<u32> {
        (**self).block_count(file_name)
    }
}
